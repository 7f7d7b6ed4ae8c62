//! Error types for sync reconciliation.

use atelier_core::CoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while reconciling a sync batch.
///
/// Any of these rejects the whole batch; there is no per-record
/// partial-success reporting.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A record references a temporary client id that no client in this
    /// batch carried.
    #[error("batch references unmapped temporary client id `{token}`")]
    UnmappedClientReference {
        /// The unresolvable token.
        token: String,
    },

    /// The same temporary id appeared twice in one batch, which would make
    /// references to it ambiguous.
    #[error("duplicate temporary id `{token}` in batch")]
    DuplicateTemporaryId {
        /// The repeated token.
        token: String,
    },

    /// An underlying store or validation error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SyncError {
    /// Creates an unmapped-reference error.
    pub fn unmapped_client_reference(token: impl Into<String>) -> Self {
        Self::UnmappedClientReference {
            token: token.into(),
        }
    }

    /// Creates a duplicate-temporary-id error.
    pub fn duplicate_temporary_id(token: impl Into<String>) -> Self {
        Self::DuplicateTemporaryId {
            token: token.into(),
        }
    }

    /// Returns true if the batch itself was malformed (caller error).
    pub fn is_malformed_batch(&self) -> bool {
        match self {
            SyncError::UnmappedClientReference { .. } | SyncError::DuplicateTemporaryId { .. } => {
                true
            }
            SyncError::Core(e) => e.is_client_error(),
        }
    }
}
