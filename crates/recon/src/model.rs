use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One observation tying an operator to an AVS at a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    pub operator: String,
    pub avs: String,
    pub snapshot: String,
}

impl Record {
    pub fn new(
        operator: impl Into<String>,
        avs: impl Into<String>,
        snapshot: impl Into<String>,
    ) -> Self {
        Self {
            operator: operator.into(),
            avs: avs.into(),
            snapshot: snapshot.into(),
        }
    }
}

/// Pre-loaded collections for one run.
pub struct ReconInput {
    /// Ground truth the index is built from.
    pub reference: Vec<Record>,
    /// Records checked against the reference.
    pub subject: Vec<Record>,
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// No (avs, operator) group in the reference.
    MissingOperator,
    /// The group exists but lacks this snapshot.
    MissingSnapshot,
}

impl MismatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MismatchKind::MissingOperator => "missing_operator",
            MismatchKind::MissingSnapshot => "missing_snapshot",
        }
    }
}

impl std::fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subject record with no counterpart in the reference.
///
/// Field values are the ones read from the subject file, before any
/// key normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub kind: MismatchKind,
    /// Zero-based position of the record in the subject collection.
    pub position: usize,
    pub operator: String,
    pub avs: String,
    pub snapshot: String,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            MismatchKind::MissingOperator => {
                write!(f, "Missing operator {} for avs {}", self.operator, self.avs)
            }
            MismatchKind::MissingSnapshot => write!(
                f,
                "Missing snapshot {} for operator {} and avs {}",
                self.snapshot, self.operator, self.avs
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Shape of the reference index after build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub avs_count: usize,
    pub pair_count: usize,
    pub snapshot_count: usize,
    /// Reference records that repeated an existing (avs, operator, snapshot).
    pub duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub reference_records: usize,
    pub subject_records: usize,
    pub matched: usize,
    pub missing_operator: usize,
    pub missing_snapshot: usize,
    pub total_mismatches: usize,
    pub index: IndexStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub reference: String,
    pub subject: String,
    pub key_transform: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub mismatches: Vec<Mismatch>,
}

impl ReconReport {
    pub fn has_mismatches(&self) -> bool {
        !self.mismatches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch(kind: MismatchKind) -> Mismatch {
        Mismatch {
            kind,
            position: 0,
            operator: "op1".into(),
            avs: "avsA".into(),
            snapshot: "2024-02-01".into(),
        }
    }

    #[test]
    fn missing_operator_line() {
        assert_eq!(
            mismatch(MismatchKind::MissingOperator).to_string(),
            "Missing operator op1 for avs avsA"
        );
    }

    #[test]
    fn missing_snapshot_line() {
        assert_eq!(
            mismatch(MismatchKind::MissingSnapshot).to_string(),
            "Missing snapshot 2024-02-01 for operator op1 and avs avsA"
        );
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_value(mismatch(MismatchKind::MissingSnapshot)).unwrap();
        assert_eq!(json["kind"], "missing_snapshot");
        assert_eq!(json["position"], 0);
    }
}
