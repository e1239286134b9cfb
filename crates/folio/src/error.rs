//! Error types for the record store.

use folio_core::{CollectionName, RecordId, ValidationError};
use folio_store::StorageError;
use thiserror::Error;

/// Errors that can occur during record store operations.
///
/// Every variant leaves the collection as it was before the call.
#[derive(Debug, Error)]
pub enum FolioError {
    /// The record or patch was rejected before anything was written.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// `update` targeted an id the collection does not hold.
    #[error("record {id} not found in collection {collection}")]
    NotFound {
        collection: CollectionName,
        id: RecordId,
    },

    /// Durable storage failed; the in-memory view stayed at the last
    /// committed state.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The registry was disposed.
    #[error("registry has been disposed")]
    Disposed,
}

impl FolioError {
    /// Whether the caller can carry on using the store after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FolioError::Disposed)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FolioError::NotFound { .. })
    }
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, FolioError>;
