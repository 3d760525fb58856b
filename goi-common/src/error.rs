//! Common error types for goi

use thiserror::Error;

/// Common result type for goi operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the goi tools
#[derive(Error, Debug)]
pub enum Error {
    /// Network transport error (wraps reqwest::Error)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// AnkiConnect reported a failure for an action
    #[error("Anki {action} failed: {message}")]
    Anki { action: String, message: String },

    /// Remote API returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response or data file could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
