//! Error types for collection-report

use thiserror::Error;

/// Result type for report operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types across the report pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Report assembly or workbook error
    #[error("Report error: {0}")]
    Report(String),

    /// Report upload error
    #[error("Upload error: {0}")]
    Upload(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
