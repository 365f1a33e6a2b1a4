//! Common error types used across the workspace.
//!
//! Each layer defines its own concrete error types. The domain layer provides
//! [`ValidationError`] and [`NotFoundError`]. Adapter layers define their own
//! (e.g., `StorageError` wrapping filesystem errors) and wire them into
//! [`WirehomeError`] via `#[from]` conversion.

/// Validation failures raised by domain invariant checks.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("component uid cannot be empty")]
    EmptyComponentUid,
    #[error("component group uid cannot be empty")]
    EmptyComponentGroupUid,
    #[error("macro uid cannot be empty")]
    EmptyMacroUid,
    #[error("setting uid cannot be empty")]
    EmptySettingUid,
    #[error("status uid cannot be empty")]
    EmptyStatusUid,
    #[error("variable uid cannot be empty")]
    EmptyVariableUid,
    #[error("invalid package uid: {0}")]
    InvalidPackageUid(String),
}

/// Returned when a lookup by identifier finds nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {uid} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub uid: String,
}

/// Top-level domain error.
///
/// Adapter crates may introduce additional variants by wrapping their own
/// error types via `#[from]`.
#[derive(Debug, thiserror::Error)]
pub enum WirehomeError {
    #[error("Validation error")]
    Validation(#[from] ValidationError),

    #[error("Not found")]
    NotFound(#[from] NotFoundError),

    #[error("Storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The process-wide cancellation signal fired. A soft signal, never
    /// logged as an error.
    #[error("Shutting down")]
    Shutdown,
}

/// Convenience alias used throughout the domain and application layers.
pub type Result<T> = std::result::Result<T, WirehomeError>;
