//! Content engine error types
//!
//! Defines all errors that can occur while reading or writing the
//! content document. The loader and saver never surface these to their
//! callers; they are logged and folded into `LoadOutcome` / `SaveReport`.

use crate::content::remote::RemoteError;
use thiserror::Error;

/// Errors that can occur in the content engine
#[derive(Error, Debug)]
pub enum ContentError {
    /// I/O operation on the local store failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Local entry would exceed the configured per-entry quota
    #[error("Quota exceeded for '{key}': {size} bytes > {limit} bytes")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },

    /// Stored data is present but not a usable document
    #[error("Corrupt data: {0}")]
    Corrupted(String),

    /// Remote store failed
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        ContentError::Serialization(err.to_string())
    }
}

/// Result type alias for content engine operations
pub type ContentResult<T> = Result<T, ContentError>;
