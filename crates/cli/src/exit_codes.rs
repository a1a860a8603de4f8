//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain    | Description                                        |
//! |------|-----------|----------------------------------------------------|
//! | 0    | Universal | Success (mismatches reported, not failed)          |
//! | 1    | check     | Mismatches found and `fail_on_mismatch` is enabled |
//! | 2    | Universal | CLI usage error (bad args, no input path)          |
//! | 3-6  | check     | Input, parse, config and output failures           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` or the relevant command

use avsaudit_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - both inputs loaded and the report was produced.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing input path for a side.
/// Clap exits with the same code for its own parse failures.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Check (1, 3-9)
// =============================================================================

/// Mismatches found while `--fail-on-mismatch` / `policy.fail_on_mismatch` is set.
/// Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_RECON_MISMATCH: u8 = 1;

/// An input file could not be opened or read.
pub const EXIT_RECON_INPUT_ACCESS: u8 = 3;

/// An input file is not a JSON array of record objects.
pub const EXIT_RECON_PARSE: u8 = 4;

/// Config file unreadable, unparsable, or failing validation.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 5;

/// Report could not be serialized or written.
pub const EXIT_RECON_RUNTIME: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::InputAccess { .. } => EXIT_RECON_INPUT_ACCESS,
        ReconError::Parse { .. } => EXIT_RECON_PARSE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_RECON_INVALID_CONFIG,
    }
}
