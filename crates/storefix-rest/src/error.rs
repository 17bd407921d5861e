//! Error types for the REST client.

use thiserror::Error;

/// Errors that can occur when talking to the shop collection.
#[derive(Debug, Error)]
pub enum RestError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-success status.
    #[error("request failed ({status}): {body}")]
    Status { status: u16, body: String },

    /// Client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RestError {
    /// Check if this error is transient and worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            RestError::Http(e) => !e.is_builder() && !e.is_decode(),
            RestError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            RestError::Json(_) | RestError::Config(_) => false,
        }
    }
}
