//! Error type shared by every analysis stage

use std::path::PathBuf;

/// Errors raised while loading or analyzing a telemetry table
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid timestamp '{value}' in column '{column}' at row {row}")]
    InvalidTimestamp {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Invalid number '{value}' in column '{column}' at row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Time column not found in table")]
    MissingTimestampColumn,

    #[error("Unknown threshold method '{0}' (expected percentile, std or iqr)")]
    UnknownThresholdMethod(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write chart: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
