//! Error types for rucher-chat

use thiserror::Error;

/// Result type alias using rucher-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the chat endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint answered with a failure status; `message` is the display
    /// string extracted from the error payload (or derived from the status)
    #[error("endpoint error ({status}): {message}")]
    Endpoint { status: u16, message: String },

    /// Endpoint URL or credential is not configured
    #[error("missing configuration: {0} is not set")]
    MissingConfig(&'static str),
}
