//! Error types for self-stats-core

use thiserror::Error;

/// Main error type for the self-stats-core library
#[derive(Error, Debug)]
pub enum Error {
    /// A required column is absent from the schema
    #[error("malformed {record_type} input: missing required column '{column}'")]
    MalformedInput {
        column: String,
        record_type: String,
    },

    /// Parallel columns disagree on length
    #[error("column '{column}' has {found} rows, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A column holds a different kind of value than the caller asked for
    #[error("column '{column}' does not hold {expected} values")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// Export file could not be understood as a whole
    #[error("parse error in {source_name} export: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for self-stats-core
pub type Result<T> = std::result::Result<T, Error>;
