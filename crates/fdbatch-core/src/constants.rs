//! Constants for batch layout, polling, and process contracts.

use std::time::Duration;

/// Directory (inside a session) holding the per-dataset parameter files.
pub const PARAMETERS_DIR: &str = "individual_estimates";

/// Directory (inside a session) holding the merged CDF files.
pub const CDF_DIR: &str = "cdf";

/// File name of the consolidated estimates table.
pub const ALL_ESTIMATES_NAME: &str = "estimates_all.csv";

/// File name of the reusable control file written next to the results.
pub const SESSION_CONTROL_NAME: &str = "session.ctl";

/// Prefix of every per-dataset parameter file.
pub const PARAMETER_FILE_PREFIX: &str = "parameters_";

/// Delimiter of the consolidated table.
pub const TABLE_DELIMITER: char = ';';

/// First column of the consolidated table header.
pub const TABLE_DATASET_COLUMN: &str = "dataset";

/// Marker placed in the header of merged CDF files.
pub const CDF_PLOT_MARKER: &str = "cdf-plot";

/// Substrings in fitting-tool output that mark a failed run.
///
/// Matching is case-sensitive and substring-based: `"no error found"`
/// counts as a failure.
pub const ERROR_MARKERS: [&str; 3] = ["invalid", "error", "Not enough"];

/// Substring that flags a line of sample-construction output.
pub const SAMPLE_ERROR_MARKER: &str = "error";

/// Default interval between two liveness polls of a running wave.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Maximum number of `_1` suffixes tried when a session name collides.
pub const MAX_SESSION_SUFFIXES: usize = 64;

/// Accepted precision range for the fitting tool.
pub const PRECISION_RANGE: (f64, f64) = (1.0, 5.0);

/// Reserved column token for the response column.
pub const RESPONSE_TOKEN: &str = "RESPONSE";

/// Reserved column token for the reaction-time column.
pub const TIME_TOKEN: &str = "TIME";

/// Exit codes of the `fdbatch` binary.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// A fitting job reported an error or produced no output.
    pub const ERROR_BATCH_FAILED: i32 = 2;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// Batch cancelled by user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_markers_are_case_sensitive_literals() {
        assert!(ERROR_MARKERS.contains(&"error"));
        assert!(!ERROR_MARKERS.contains(&"Error"));
        assert!(ERROR_MARKERS.contains(&"Not enough"));
    }

    #[test]
    fn precision_range_is_ordered() {
        assert!(PRECISION_RANGE.0 < PRECISION_RANGE.1);
    }
}
