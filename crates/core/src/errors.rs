//! Error types for QuoteSync core operations.

use thiserror::Error;

/// Result type alias for QuoteSync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while syncing, importing, or persisting quotes.
///
/// Every variant is recoverable: a failed operation leaves the previously
/// persisted collection intact and is reported through the event or
/// return-value channel of the operation that hit it.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure, timeout, or non-success response from the remote
    /// quote service. Retried only by the next scheduled or manual cycle.
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed import payload or remote schema mismatch. Rejects the
    /// operation and leaves state untouched.
    #[error("Format error: {0}")]
    Format(String),

    /// Persistence write failure. Reads degrade to an empty collection
    /// instead of raising; a failed save surfaces as a failed cycle.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}
