//! Error types for amlgraph.

use thiserror::Error;

/// Result type alias for amlgraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing AML graph data.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Ledger errors
    #[error("Schema mismatch: missing columns {missing:?} (extra columns: {extra:?})")]
    Schema {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("Transaction ledger contains no records")]
    EmptyLedger,

    #[error("Shape mismatch: {0}")]
    Shape(String),

    // Split errors
    #[error("Split search failed: {0}")]
    Split(String),

    // Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}
