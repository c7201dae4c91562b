//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 60-69   | match            | Name reconciliation codes                |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map it in `recon_exit_code` if it comes from the engine

use namematch_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unsupported output format.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Match (60-69)
// =============================================================================

/// Config file could not be parsed or failed validation.
pub const EXIT_MATCH_CONFIG: u8 = 60;

/// Input table lacks the source column or any usable name columns.
pub const EXIT_MATCH_SCHEMA: u8 = 61;

/// No primary or no secondary rows after classification.
pub const EXIT_MATCH_EMPTY_PARTITION: u8 = 62;

/// Input or config file could not be read.
pub const EXIT_MATCH_READ: u8 = 63;

/// Result file or report could not be written.
pub const EXIT_MATCH_WRITE: u8 = 64;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_MATCH_CONFIG,
        ReconError::EmptyPartition { .. } => EXIT_MATCH_EMPTY_PARTITION,
        ReconError::Io(_) => EXIT_MATCH_READ,
        _ if err.is_input_schema() => EXIT_MATCH_SCHEMA,
        _ => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namematch_recon::Source;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_MATCH_CONFIG,
            EXIT_MATCH_SCHEMA,
            EXIT_MATCH_EMPTY_PARTITION,
            EXIT_MATCH_READ,
            EXIT_MATCH_WRITE,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn engine_errors_map_to_match_range() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_MATCH_CONFIG);
        assert_eq!(
            recon_exit_code(&ReconError::MissingSourceColumn { column: "источник".into() }),
            EXIT_MATCH_SCHEMA
        );
        assert_eq!(
            recon_exit_code(&ReconError::MissingNameColumns {
                parts: vec!["Фамилия".into()],
                keywords: vec!["фио".into()],
            }),
            EXIT_MATCH_SCHEMA
        );
        assert_eq!(
            recon_exit_code(&ReconError::EmptyPartition {
                side: Source::Primary,
                keyword: "зуп".into()
            }),
            EXIT_MATCH_EMPTY_PARTITION
        );
        assert_eq!(recon_exit_code(&ReconError::Io("gone".into())), EXIT_MATCH_READ);
    }
}
