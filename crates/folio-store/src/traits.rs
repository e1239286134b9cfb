//! Storage trait: the abstract interface for durable key-value persistence.
//!
//! This trait keeps the record store backend-agnostic. Implementations
//! include SQLite (durable) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// One entry of an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    /// Insert or overwrite a key.
    Set { key: String, value: String },
    /// Delete a key (absent keys are ignored).
    Remove { key: String },
}

impl Write {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Write::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Write::Remove { key: key.into() }
    }
}

/// The Storage trait: async interface for durable string key-value storage.
///
/// All methods are async so that genuinely asynchronous backends fit
/// without changing callers. For SQLite, `spawn_blocking` is used internally
/// to avoid blocking the runtime.
///
/// # Contract
///
/// - A successful write is durable before the future resolves.
/// - A failed write leaves every key exactly as it was.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Apply several writes atomically: all of them or none.
    async fn write_batch(&self, writes: &[Write]) -> Result<()>;

    /// List keys starting with `prefix`, sorted.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Push any buffered state to durable media.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key).await
    }

    async fn write_batch(&self, writes: &[Write]) -> Result<()> {
        (**self).write_batch(writes).await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys(prefix).await
    }

    async fn flush(&self) -> Result<()> {
        (**self).flush().await
    }
}
