//! Error types for dupwatch.

use thiserror::Error;

/// Result type alias using dupwatch's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dupwatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Tracker search call failed or returned malformed data
    #[error("Search error: {0}")]
    Search(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Text generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Generative output could not be coerced to structured data
    #[error("Parse error: {0}")]
    Parse(String),

    /// Vector length mismatch during similarity ranking
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Configuration error (missing scope, project key, credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input to a public operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
