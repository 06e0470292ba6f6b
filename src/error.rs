use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to load series {series}: {reason}")]
    Load { series: String, reason: String },

    #[error("Bad data in series {series} at row {row}, column {column}: {reason}")]
    DataFormat {
        series: String,
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Failed to write series {series} to {path}: {reason}")]
    Write {
        series: String,
        path: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Io(format!("CSV error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Io(format!("JSON error: {}", err))
    }
}

impl AppError {
    /// Short label used in run summaries and reports
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Load { .. } => "load",
            AppError::DataFormat { .. } => "data_format",
            AppError::Write { .. } => "write",
            AppError::InvalidInput(_) => "invalid_input",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Alias for convenience
pub type Error = AppError;
