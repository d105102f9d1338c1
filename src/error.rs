//! Error types for the storage and remote-service seams
//!
//! The simulation itself never fails; these only surface from optional
//! collaborators and are logged and swallowed by the app layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// No backing store (private mode, storage disabled, no window)
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("corrupt stored value for {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected response status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}
