//! Storage-specific error type wrapping filesystem errors.

use wirehome_domain::error::WirehomeError;

/// Errors originating from the JSON document tree.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A filesystem operation failed.
    #[error("filesystem error")]
    Io(#[from] std::io::Error),

    /// Failed to (de)serialize a stored JSON document.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// A path segment would escape the data directory.
    #[error("invalid path segment: {0}")]
    InvalidPathSegment(String),
}

impl From<StorageError> for WirehomeError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
