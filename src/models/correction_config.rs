use crate::constants::{
    env_var, DEFAULT_CORRECTION_FACTOR, DEFAULT_ITERATION_LIMIT, DEFAULT_OUTPUT_DIR,
    DEFAULT_OUTPUT_PREFIX, DEFAULT_SOURCE_DIR, DEFAULT_TOLERANCE_MARGIN, SUSPICIOUS_MARGIN,
};
use crate::error::Error;
use crate::utils::{env_or, get_output_data_dir, get_source_data_dir, parse_flag};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Parameters of the denomination correction scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Suspected ratio between the two denominations
    pub correction_factor: f64,

    /// Allowed relative error for a factor match, as a fraction (0.05 = 5%)
    pub tolerance_margin: f64,

    /// Trace every comparison and decision at debug level
    pub debug: bool,

    /// Max series processed per run in debug mode, 0 = no cap
    pub iteration_limit: usize,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            correction_factor: DEFAULT_CORRECTION_FACTOR,
            tolerance_margin: DEFAULT_TOLERANCE_MARGIN,
            debug: false,
            iteration_limit: DEFAULT_ITERATION_LIMIT,
        }
    }
}

impl CorrectionConfig {
    /// Create a validated config with debug tracing off
    pub fn new(correction_factor: f64, tolerance_margin: f64) -> Result<Self, Error> {
        let config = Self {
            correction_factor,
            tolerance_margin,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check factor and margin ranges
    pub fn validate(&self) -> Result<(), Error> {
        if !self.correction_factor.is_finite() || self.correction_factor <= 0.0 {
            return Err(Error::Config(format!(
                "correction_factor must be a positive number, got {}",
                self.correction_factor
            )));
        }

        if !self.tolerance_margin.is_finite() || !(0.0..=1.0).contains(&self.tolerance_margin) {
            return Err(Error::Config(format!(
                "tolerance_margin must be between 0 and 1, got {}",
                self.tolerance_margin
            )));
        }

        Ok(())
    }

    /// Iteration limit as seen by the scan: only nonzero in debug mode
    pub fn effective_iteration_limit(&self) -> usize {
        if self.debug {
            self.iteration_limit
        } else {
            0
        }
    }

    /// Whether the margin is looser than any realistic denomination check needs
    pub fn is_margin_suspicious(&self) -> bool {
        self.tolerance_margin > SUSPICIOUS_MARGIN
    }
}

/// Where series are read from and written to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    pub source_directory: PathBuf,
    pub output_directory: PathBuf,
    /// Prepended to the series identifier to name the corrected file
    pub output_prefix: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

impl PathConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.output_prefix.is_empty() {
            return Err(Error::Config("output_prefix must not be empty".to_string()));
        }
        if self.output_prefix.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "output_prefix must not contain path separators, got '{}'",
                self.output_prefix
            )));
        }
        Ok(())
    }

    /// File name of the corrected series
    pub fn output_name(&self, series_id: &str) -> String {
        format!("{}{}", self.output_prefix, series_id)
    }

    /// Full path of the corrected series
    pub fn output_path(&self, series_id: &str) -> PathBuf {
        self.output_directory.join(self.output_name(series_id))
    }

    /// True when corrected files land next to their sources
    pub fn writes_in_place(&self) -> bool {
        self.source_directory == self.output_directory
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub correction: CorrectionConfig,
    pub paths: PathConfig,
}

impl AppConfig {
    /// Defaults overlaid with `DENOMFIX_*` environment variables
    pub fn from_env() -> Result<Self, Error> {
        let debug = match std::env::var(env_var::DEBUG) {
            Ok(raw) => parse_flag(env_var::DEBUG, &raw)?,
            Err(_) => false,
        };

        let correction = CorrectionConfig {
            correction_factor: env_or(env_var::FACTOR, DEFAULT_CORRECTION_FACTOR)?,
            tolerance_margin: env_or(env_var::MARGIN, DEFAULT_TOLERANCE_MARGIN)?,
            debug,
            iteration_limit: env_or(env_var::ITERATION_LIMIT, DEFAULT_ITERATION_LIMIT)?,
        };

        let paths = PathConfig {
            source_directory: get_source_data_dir(),
            output_directory: get_output_data_dir(),
            output_prefix: env_or(env_var::OUTPUT_PREFIX, DEFAULT_OUTPUT_PREFIX.to_string())?,
        };

        Ok(Self { correction, paths })
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.correction.validate()?;
        self.paths.validate()
    }

    /// Log warnings for settings that are legal but probably wrong
    pub fn warn_if_suspicious(&self) {
        if self.correction.is_margin_suspicious() {
            warn!(
                margin = self.correction.tolerance_margin,
                "Tolerance margin of {:.0}% is very loose and will match unrelated prices; 0.01-0.05 is typical",
                self.correction.tolerance_margin * 100.0
            );
        }
    }
}
