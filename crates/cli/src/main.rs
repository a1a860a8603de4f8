// avsaudit CLI - operator/AVS snapshot audits between two JSON exports

mod check;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use avsaudit_recon::KeyTransform;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "avsaudit")]
#[command(about = "Check an operator/AVS snapshot export against a reference export")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report subject records with no matching (avs, operator, snapshot) in the reference
    #[command(after_help = "\
Mismatches are findings, not failures: exit code is 0 unless --fail-on-mismatch \
(or policy.fail_on_mismatch in the config) is set, in which case it is 1.

Examples:
  avsaudit check sidecar.json blocklake.json
  avsaudit check sidecar.json blocklake.json --json
  avsaudit check --config audit.toml --output report.json
  avsaudit check sidecar.json blocklake.json --key-transform lowercase --fail-on-mismatch")]
    Check {
        /// Subject file: JSON array of {operator, avs, snapshot} to verify
        subject: Option<PathBuf>,

        /// Reference file: JSON array of {operator, avs, snapshot} treated as ground truth
        reference: Option<PathBuf>,

        /// TOML config naming sources, field keys, matching and policy
        #[arg(long, short = 'c', env = "AVSAUDIT_CONFIG")]
        config: Option<PathBuf>,

        /// Output the JSON report to stdout instead of the line report
        #[arg(long)]
        json: bool,

        /// Write the JSON report to file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit 1 when any mismatch is found
        #[arg(long)]
        fail_on_mismatch: bool,

        /// Normalize fields before matching: none, trim or lowercase
        #[arg(long, value_name = "MODE")]
        key_transform: Option<KeyTransform>,
    },

    /// Validate an audit config without running
    #[command(after_help = "\
Examples:
  avsaudit validate audit.toml")]
    Validate {
        /// Path to the .toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  avsaudit-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  avsaudit-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

/// Logs go to stderr so stdout stays a data channel. `AVSAUDIT_LOG` takes an
/// env-filter directive and overrides `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("AVSAUDIT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show usage
            eprintln!("Usage: avsaudit <command> [options]");
            eprintln!("       avsaudit --help for more information");
            Ok(())
        }
        Some(Commands::Check {
            subject,
            reference,
            config,
            json,
            output,
            fail_on_mismatch,
            key_transform,
        }) => check::cmd_check(
            check::CheckOptions {
                subject,
                reference,
                config,
                json,
                output,
                fail_on_mismatch,
                key_transform,
            },
            &args,
        ),
        Some(Commands::Validate { config }) => check::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
