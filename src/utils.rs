use crate::constants::{env_var, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR};
use crate::error::Error;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Get source data directory from environment variable or use default
pub fn get_source_data_dir() -> PathBuf {
    std::env::var(env_var::SOURCE_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOURCE_DIR))
}

/// Get output data directory from environment variable or use default
pub fn get_output_data_dir() -> PathBuf {
    std::env::var(env_var::OUTPUT_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

/// Read and parse an environment variable, falling back to `default` when unset.
///
/// A variable that is set but does not parse is reported as a config error.
pub fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, Error> {
    match std::env::var(name) {
        Ok(raw) => parse_setting(name, &raw),
        Err(_) => Ok(default),
    }
}

/// Parse a single setting value, naming the setting on failure
pub fn parse_setting<T: FromStr>(name: &str, raw: &str) -> Result<T, Error> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::Config(format!("Invalid value for {}: '{}'", name, raw)))
}

/// Parse a boolean flag the way shells usually spell them
pub fn parse_flag(name: &str, raw: &str) -> Result<bool, Error> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::Config(format!("Invalid value for {}: '{}'", name, raw))),
    }
}

/// Parse series identifiers from command line argument
pub fn parse_series_filter(series_arg: Option<String>) -> Result<Option<Vec<String>>, Error> {
    match series_arg {
        None => Ok(None), // Process all series
        Some(series_str) => {
            let series: Vec<String> = series_str
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();

            if series.is_empty() {
                return Err(Error::InvalidInput("No valid series specified".to_string()));
            }

            Ok(Some(series))
        }
    }
}

/// Check if a series should be processed based on the target filter.
///
/// Filter entries match either the full file name or its stem ("AAPL" matches "AAPL.csv").
pub fn should_process_series(series_id: &str, target_series: &Option<Vec<String>>) -> bool {
    match target_series {
        None => true,
        Some(targets) => {
            let full = series_id.to_uppercase();
            let stem = Path::new(series_id)
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_uppercase())
                .unwrap_or_else(|| full.clone());
            targets.iter().any(|t| *t == full || *t == stem)
        }
    }
}

/// Format a price for CSV output, always keeping at least one decimal place
pub fn format_price(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
