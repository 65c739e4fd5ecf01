//! Error types for the remote gateway crate.

use thiserror::Error;

/// Result type alias for remote gateway operations.
pub type Result<T> = std::result::Result<T, RemoteSyncError>;

/// Errors that can occur while talking to the remote quote service.
#[derive(Debug, Error)]
pub enum RemoteSyncError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the remote service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A remote record that parsed but cannot adapt into the quote model
    #[error("Schema error: {0}")]
    Schema(String),
}

impl RemoteSyncError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}

impl From<RemoteSyncError> for quotesync_core::Error {
    fn from(err: RemoteSyncError) -> Self {
        match err {
            RemoteSyncError::Schema(message) => quotesync_core::Error::Format(message),
            other => quotesync_core::Error::Network(other.to_string()),
        }
    }
}
