//! Error types for Hiber Flux

use thiserror::Error;

/// Errors that can occur while analyzing a subject
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
