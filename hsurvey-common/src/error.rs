//! Common error types for the survey service

use thiserror::Error;

/// Common result type for survey operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the survey crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fallback file read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding of the nested expenses document
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
