//! CSV Format and Correction Constants
//!
//! Column names for the per-instrument price files and the defaults used
//! when no environment variable or CLI flag overrides them.

/// Required columns in every source file (order in the file is not significant)
pub mod csv_column {
    pub const DATE: &str = "Date";
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const VOLUME: &str = "Volume";

    /// Columns written to the corrected file, after the unnamed row-index column
    pub const OUTPUT_HEADER: [&str; 6] = [DATE, OPEN, HIGH, LOW, CLOSE, VOLUME];
}

/// Suspected ratio between the two denominations (dollars vs. cents)
pub const DEFAULT_CORRECTION_FACTOR: f64 = 100.0;

/// Relative error allowed when testing for a factor match.
///
/// 70% is carried over as the default but is far too loose for real data:
/// almost any two positive prices of similar magnitude will match.
pub const DEFAULT_TOLERANCE_MARGIN: f64 = 0.70;

/// Margins above this value trigger a startup warning
pub const SUSPICIOUS_MARGIN: f64 = 0.05;

/// Cap on series processed in one debug run (only active in debug mode)
pub const DEFAULT_ITERATION_LIMIT: usize = 1000;

pub const DEFAULT_SOURCE_DIR: &str = "sourcedata";
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_OUTPUT_PREFIX: &str = "fixed-";

/// File extension of series files picked up from the source directory
pub const SERIES_EXTENSION: &str = "csv";

/// Environment variables read by `AppConfig::from_env`
pub mod env_var {
    pub const SOURCE_DIR: &str = "DENOMFIX_SOURCE_DIR";
    pub const OUTPUT_DIR: &str = "DENOMFIX_OUTPUT_DIR";
    pub const OUTPUT_PREFIX: &str = "DENOMFIX_OUTPUT_PREFIX";
    pub const FACTOR: &str = "DENOMFIX_FACTOR";
    pub const MARGIN: &str = "DENOMFIX_MARGIN";
    pub const DEBUG: &str = "DENOMFIX_DEBUG";
    pub const ITERATION_LIMIT: &str = "DENOMFIX_ITERATION_LIMIT";
}
