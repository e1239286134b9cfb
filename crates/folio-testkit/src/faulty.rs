//! Storage wrapper that fails writes on demand.
//!
//! Reads always pass through, so tests can check that a rejected write left
//! the stored value untouched.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use folio_store::{Result, Storage, StorageError, Write};

pub struct FaultyStorage<S> {
    inner: S,
    fail_all: AtomicBool,
    fail_next: AtomicUsize,
    writes: AtomicUsize,
}

impl<S: Storage> FaultyStorage<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_all: AtomicBool::new(false),
            fail_next: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Fail every write until switched off again.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Fail the next `n` writes, then recover.
    pub fn fail_next_writes(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Writes that reached the inner storage.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self, op: &str) -> Result<()> {
        let fail = self.fail_all.load(Ordering::SeqCst)
            || self
                .fail_next
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();

        if fail {
            tracing::debug!(op, "injected storage failure");
            return Err(StorageError::Unavailable(format!("injected failure on {}", op)));
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl<S: Storage> Storage for FaultyStorage<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check("set")?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        self.check("remove")?;
        self.inner.remove(key).await
    }

    async fn write_batch(&self, writes: &[Write]) -> Result<()> {
        self.check("write_batch")?;
        self.inner.write_batch(writes).await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.keys(prefix).await
    }

    async fn flush(&self) -> Result<()> {
        self.inner.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_store::MemoryStorage;

    #[tokio::test]
    async fn test_fail_next_writes_recovers() {
        let storage = FaultyStorage::new(MemoryStorage::new());
        storage.fail_next_writes(2);

        assert!(storage.set("k", "1").await.is_err());
        assert!(storage.write_batch(&[Write::set("k", "2")]).await.is_err());
        storage.set("k", "3").await.unwrap();

        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("3"));
        assert_eq!(storage.write_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_writes_toggle() {
        let storage = FaultyStorage::new(MemoryStorage::new());
        storage.fail_writes(true);
        assert!(matches!(
            storage.set("k", "v").await,
            Err(StorageError::Unavailable(_))
        ));

        storage.fail_writes(false);
        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.inner().len().unwrap(), 1);
    }
}
