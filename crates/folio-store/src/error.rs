//! Error types for the storage module.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A write would exceed the storage quota.
    #[error("storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Storage cannot be used right now (disabled, lock poisoned, task failed).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be interpreted.
    #[error("corrupt value under {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
