use std::borrow::Cow;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration, usually read from an `.audit.toml` file.
///
/// Every section is optional. An empty document yields the defaults used
/// when no config file is given: sources labelled `reference` and `subject`,
/// JSON keys `operator` / `avs` / `snapshot`, exact matching, and mismatches
/// that do not fail the run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub reference: SourceConfig,
    #[serde(default)]
    pub subject: SourceConfig,
    #[serde(default, rename = "match")]
    pub matching: MatchConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_name() -> String {
    "avsaudit".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            reference: SourceConfig::default(),
            subject: SourceConfig::default(),
            matching: MatchConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Label used in output. Defaults to the side name.
    #[serde(default)]
    pub name: Option<String>,
    /// JSON file, relative to the config file's directory.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub fields: FieldMapping,
}

impl SourceConfig {
    fn label_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }
}

/// JSON keys holding each record field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMapping {
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default = "default_avs")]
    pub avs: String,
    #[serde(default = "default_snapshot")]
    pub snapshot: String,
}

fn default_operator() -> String {
    "operator".into()
}

fn default_avs() -> String {
    "avs".into()
}

fn default_snapshot() -> String {
    "snapshot".into()
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            operator: default_operator(),
            avs: default_avs(),
            snapshot: default_snapshot(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching + Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    #[serde(default)]
    pub key_transform: KeyTransform,
}

/// Normalization applied to every field of both collections before indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTransform {
    #[default]
    None,
    /// Strip leading/trailing whitespace.
    Trim,
    /// Trim, then lowercase. Hex addresses compare case-insensitively.
    Lowercase,
}

impl KeyTransform {
    pub fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            KeyTransform::None => Cow::Borrowed(value),
            KeyTransform::Trim => Cow::Borrowed(value.trim()),
            KeyTransform::Lowercase => Cow::Owned(value.trim().to_lowercase()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyTransform::None => "none",
            KeyTransform::Trim => "trim",
            KeyTransform::Lowercase => "lowercase",
        }
    }
}

impl std::str::FromStr for KeyTransform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(KeyTransform::None),
            "trim" => Ok(KeyTransform::Trim),
            "lowercase" => Ok(KeyTransform::Lowercase),
            other => Err(format!(
                "unknown key transform '{other}' (expected none, trim or lowercase)"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Treat any mismatch as a failed run.
    #[serde(default)]
    pub fail_on_mismatch: bool,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn reference_name(&self) -> &str {
        self.reference.label_or("reference")
    }

    pub fn subject_name(&self) -> &str {
        self.subject.label_or("subject")
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        let reference = self.reference_name();
        let subject = self.subject_name();
        for label in [reference, subject] {
            if label.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "source name must not be empty".into(),
                ));
            }
        }
        if reference == subject {
            return Err(ReconError::ConfigValidation(format!(
                "reference and subject share the name '{reference}'"
            )));
        }

        for (label, source) in [(reference, &self.reference), (subject, &self.subject)] {
            if let Some(ref file) = source.file {
                if file.trim().is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "source '{label}': file must not be empty"
                    )));
                }
            }
            validate_fields(label, &source.fields)?;
        }

        Ok(())
    }
}

fn validate_fields(label: &str, fields: &FieldMapping) -> Result<(), ReconError> {
    let keys = [
        ("operator", &fields.operator),
        ("avs", &fields.avs),
        ("snapshot", &fields.snapshot),
    ];

    for (field, key) in keys {
        if key.is_empty() {
            return Err(ReconError::ConfigValidation(format!(
                "source '{label}': field '{field}' maps to an empty key"
            )));
        }
    }

    for (i, (field_a, key_a)) in keys.iter().enumerate() {
        for (field_b, key_b) in &keys[i + 1..] {
            if key_a == key_b {
                return Err(ReconError::ConfigValidation(format!(
                    "source '{label}': fields '{field_a}' and '{field_b}' both read key '{key_a}'"
                )));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
