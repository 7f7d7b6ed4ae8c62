//! Error types for the core store.

use crate::model::RecordKind;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record lookup by id found nothing.
    #[error("{kind} {id} not found")]
    NotFound {
        /// The kind of record searched.
        kind: RecordKind,
        /// The id that was not found.
        id: i64,
    },

    /// A write was rejected before touching the store.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the rejected input.
        message: String,
    },

    /// Another process holds the data directory lock.
    #[error("store locked: another process has exclusive access")]
    StoreLocked,

    /// Snapshot encoding or decoding failed.
    #[error("snapshot error: {message}")]
    Snapshot {
        /// Description of the codec failure.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Creates a not-found error.
    pub fn not_found(kind: RecordKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a validation error for a missing required field.
    pub fn missing_field(kind: RecordKind, field: &str) -> Self {
        Self::Validation {
            message: format!("{kind} is missing required field `{field}`"),
        }
    }

    /// Creates a snapshot codec error.
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot {
            message: message.into(),
        }
    }

    /// Returns true if the error is caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CoreError::NotFound { .. } | CoreError::Validation { .. })
    }
}
