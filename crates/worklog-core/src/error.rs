//! Error types for the work-log service.

use thiserror::Error;

/// Main error type for work-log operations
#[derive(Error, Debug)]
pub enum WorklogError {
    /// Input failed a field-level validation rule
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// Human-readable description of the violated rule
        message: String,
        /// The value that was supplied, when one was
        provided: Option<String>,
    },

    /// Session identifier is malformed or could not be resolved
    #[error("Session error for '{session_id}': {message}")]
    Session {
        /// The offending session identifier, kept for diagnostics
        session_id: String,
        message: String,
    },

    /// Persistence-layer failure
    #[error("Storage error during '{operation}': {message}")]
    Storage {
        /// The store operation that failed (e.g. "create", "get_logs")
        operation: String,
        message: String,
        /// Transient failures (lock contention, timeout) are safe to retry
        /// with backoff; everything else must not be retried.
        retryable: bool,
    },

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No usable data directory for the default store location
    #[error("Could not determine a data directory for the log store")]
    DataDirNotFound,

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorklogError {
    /// Build a validation error for `field`.
    pub fn validation(
        field: impl Into<String>,
        message: impl Into<String>,
        provided: Option<&str>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            provided: provided.map(str::to_string),
        }
    }

    /// Build a session error carrying the offending identifier.
    pub fn session(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Session {
            session_id: session_id.into(),
            message: message.into(),
        }
    }

    /// Build a storage error for `operation`.
    pub fn storage(
        operation: impl Into<String>,
        retryable: bool,
        message: impl Into<String>,
    ) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.into(),
            retryable,
        }
    }

    /// Whether the caller may retry the failed call with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { retryable: true, .. })
    }

    /// Stable error-kind tag used by the external envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::Session { .. } => "SessionError",
            Self::Storage { .. } => "StorageError",
            _ => "InternalError",
        }
    }
}

/// Result type for work-log operations
pub type Result<T> = std::result::Result<T, WorklogError>;
