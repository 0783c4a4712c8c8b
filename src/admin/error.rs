//! Edit error types
//!
//! Every edit is checked before the document is touched; an error means the
//! document was left as it was.

use thiserror::Error;

/// Errors returned by editing operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// A required input was empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Index no longer points into the collection
    #[error("No {collection} at index {index} (have {len})")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Album not found: {0}")]
    AlbumNotFound(String),

    /// Visitor input rejected
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Image file could not be turned into a URL
    #[error("Image error: {0}")]
    Media(String),
}

/// Result type alias for edits
pub type EditResult<T> = Result<T, EditError>;
