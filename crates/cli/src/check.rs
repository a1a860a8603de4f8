//! `avsaudit check` / `avsaudit validate`: subject vs reference snapshot audit.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use avsaudit_recon::load::load_records_from_path;
use avsaudit_recon::{KeyTransform, ReconConfig, ReconInput, ReconReport};

use crate::exit_codes::{
    recon_exit_code, EXIT_RECON_INVALID_CONFIG, EXIT_RECON_MISMATCH, EXIT_RECON_RUNTIME,
    EXIT_USAGE,
};
use crate::CliError;

/// Options for a single `check` invocation.
pub struct CheckOptions {
    pub subject: Option<PathBuf>,
    pub reference: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub fail_on_mismatch: bool,
    pub key_transform: Option<KeyTransform>,
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

/// Read and validate a config file.
fn read_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        recon_err(
            EXIT_RECON_INVALID_CONFIG,
            format!("cannot read config {}: {e}", path.display()),
        )
    })?;
    ReconConfig::from_toml(&config_str).map_err(|e| recon_err(EXIT_RECON_INVALID_CONFIG, e.to_string()))
}

/// Pick the input path for one side: command line first, then the config
/// file's entry resolved against the config's directory.
fn resolve_input(
    side: &str,
    cli_path: Option<PathBuf>,
    config_file: Option<&str>,
    base_dir: &Path,
) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_path {
        return Ok(path);
    }
    match config_file {
        Some(file) => Ok(base_dir.join(file)),
        None => Err(recon_err(EXIT_USAGE, format!("no {side} file given")).with_hint(format!(
            "pass <SUBJECT> <REFERENCE>, or set [{side}].file in --config"
        ))),
    }
}

pub fn cmd_check(opts: CheckOptions, args: &[String]) -> Result<(), CliError> {
    let (mut config, base_dir) = match opts.config {
        Some(ref path) => {
            let config = read_config(path)?;
            let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            (config, base_dir)
        }
        None => (ReconConfig::default(), PathBuf::from(".")),
    };

    if let Some(transform) = opts.key_transform {
        config.matching.key_transform = transform;
    }
    let fail_on_mismatch = opts.fail_on_mismatch || config.policy.fail_on_mismatch;

    let subject_path =
        resolve_input("subject", opts.subject, config.subject.file.as_deref(), &base_dir)?;
    let reference_path =
        resolve_input("reference", opts.reference, config.reference.file.as_deref(), &base_dir)?;

    tracing::debug!(
        subject = %subject_path.display(),
        reference = %reference_path.display(),
        "resolved inputs"
    );

    // Both loads must succeed before anything is reported.
    let subject = load_records_from_path(config.subject_name(), &subject_path, &config.subject.fields)
        .map_err(|e| recon_err(recon_exit_code(&e), e.to_string()))?;
    let reference =
        load_records_from_path(config.reference_name(), &reference_path, &config.reference.fields)
            .map_err(|e| recon_err(recon_exit_code(&e), e.to_string()))?;

    let input = ReconInput { reference, subject };
    let report = avsaudit_recon::run(&config, &input)
        .map_err(|e| recon_err(recon_exit_code(&e), e.to_string()))?;

    // Output
    if opts.json || opts.output.is_some() {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = opts.output {
            std::fs::write(path, &json_str)
                .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }

        if opts.json {
            println!("{json_str}");
        }
    }

    if !opts.json {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_human(&mut out, args, &report)
            .and_then(|()| out.flush())
            .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot write report: {e}")))?;
    }

    let s = &report.summary;
    tracing::info!(
        matched = s.matched,
        missing_operator = s.missing_operator,
        missing_snapshot = s.missing_snapshot,
        "{} vs {}: {} of {} record(s) unaccounted for",
        report.meta.subject,
        report.meta.reference,
        s.total_mismatches,
        s.subject_records,
    );

    if fail_on_mismatch && report.has_mismatches() {
        return Err(recon_err(
            EXIT_RECON_MISMATCH,
            format!("{} mismatch(es) found", s.total_mismatches),
        ));
    }

    Ok(())
}

/// Line-oriented report: argv echo, both lengths, one line per mismatch,
/// then the mismatch count alone on the last line.
pub fn write_human<W: Write>(out: &mut W, args: &[String], report: &ReconReport) -> io::Result<()> {
    writeln!(out, "args: {args:?}")?;
    writeln!(out, "{} length: {}", report.meta.reference, report.summary.reference_records)?;
    writeln!(out, "{} length: {}", report.meta.subject, report.summary.subject_records)?;
    for m in &report.mismatches {
        writeln!(out, "{m}")?;
    }
    writeln!(out, "{}", report.summary.total_mismatches)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "valid: '{}' ({} vs {}, key transform: {})",
        config.name,
        config.subject_name(),
        config.reference_name(),
        config.matching.key_transform.as_str(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use avsaudit_recon::Record;

    fn report() -> ReconReport {
        let config = ReconConfig::from_toml(
            "[reference]\nname = \"blocklake\"\n[subject]\nname = \"sidecar\"\n",
        )
        .unwrap();
        let input = ReconInput {
            reference: vec![Record::new("op1", "avsA", "2024-01-01")],
            subject: vec![
                Record::new("op1", "avsA", "2024-01-01"),
                Record::new("op2", "avsA", "2024-01-01"),
                Record::new("op1", "avsA", "2024-02-01"),
            ],
        };
        avsaudit_recon::run(&config, &input).unwrap()
    }

    #[test]
    fn human_report_lines() {
        let args = vec!["avsaudit".to_string(), "check".to_string()];
        let mut buf = Vec::new();
        write_human(&mut buf, &args, &report()).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"args: ["avsaudit", "check"]"#,
                "blocklake length: 1",
                "sidecar length: 3",
                "Missing operator op2 for avs avsA",
                "Missing snapshot 2024-02-01 for operator op1 and avs avsA",
                "2",
            ]
        );
    }

    #[test]
    fn cli_path_wins_over_config() {
        let path = resolve_input(
            "subject",
            Some(PathBuf::from("cli.json")),
            Some("config.json"),
            Path::new("/etc/audit"),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("cli.json"));
    }

    #[test]
    fn config_path_is_relative_to_config_dir() {
        let path = resolve_input("subject", None, Some("sidecar.json"), Path::new("/etc/audit")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/audit/sidecar.json"));
    }

    #[test]
    fn missing_input_is_usage_error() {
        let err = resolve_input("reference", None, None, Path::new(".")).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.hint.is_some());
    }
}
