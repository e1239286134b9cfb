//! In-memory implementation of the Storage trait.
//!
//! Same semantics as SQLite but nothing survives the process. An optional
//! byte quota emulates the size limit of browser-local storage, counted as
//! the sum of key and value lengths.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{Result, StorageError};
use crate::traits::{Storage, Write};

/// In-memory storage implementation.
///
/// All data is lost when the storage is dropped. Thread-safe via RwLock.
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create a new empty storage with no quota.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota: None,
        }
    }

    /// Create a new empty storage that rejects writes past `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota: Some(bytes),
        }
    }

    /// Bytes currently in use.
    pub fn usage(&self) -> Result<usize> {
        let entries = self.read()?;
        Ok(usage_of(&entries))
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .read()
            .map_err(|e| StorageError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .write()
            .map_err(|e| StorageError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn check_quota(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(quota) = self.quota {
            let needed = usage_of(entries);
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn usage_of(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.write_batch(&[Write::set(key, value)]).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.write()?.remove(key).is_some())
    }

    async fn write_batch(&self, writes: &[Write]) -> Result<()> {
        let mut entries = self.write()?;

        // Apply to a copy so a rejected batch leaves nothing behind
        let mut next = entries.clone();
        for write in writes {
            match write {
                Write::Set { key, value } => {
                    next.insert(key.clone(), value.clone());
                }
                Write::Remove { key } => {
                    next.remove(key);
                }
            }
        }

        self.check_quota(&next)?;
        *entries = next;
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.read()?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_basic() {
        let storage = MemoryStorage::new();

        storage.set("folio:faqs", "[]").await.unwrap();
        assert_eq!(storage.get("folio:faqs").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.get("folio:pages").await.unwrap(), None);

        assert!(storage.remove("folio:faqs").await.unwrap());
        assert!(!storage.remove("folio:faqs").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_by_prefix() {
        let storage = MemoryStorage::new();
        storage.set("folio:b", "1").await.unwrap();
        storage.set("folio:a", "1").await.unwrap();
        storage.set("other:a", "1").await.unwrap();

        let keys = storage.keys("folio:").await.unwrap();
        assert_eq!(keys, vec!["folio:a".to_string(), "folio:b".to_string()]);
    }

    #[tokio::test]
    async fn test_quota_rejects_and_keeps_previous_value() {
        let storage = MemoryStorage::with_quota(16);
        storage.set("k", "small").await.unwrap();

        let err = storage.set("k", "much too large for the quota").await.unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { quota: 16, .. }));
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("small"));
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let storage = MemoryStorage::with_quota(10);
        let batch = [Write::set("a", "1"), Write::set("b", "way past the quota")];

        assert!(storage.write_batch(&batch).await.is_err());
        assert!(storage.is_empty().unwrap());

        storage
            .write_batch(&[Write::set("a", "1"), Write::set("b", "2")])
            .await
            .unwrap();
        assert_eq!(storage.usage().unwrap(), 4);
    }

    proptest::proptest! {
        #[test]
        fn test_keys_sorted_and_prefixed(
            keys in proptest::collection::vec("(folio:|misc:)[a-z]{1,8}", 0..32)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let storage = MemoryStorage::new();
                for key in &keys {
                    storage.set(key, "v").await.unwrap();
                }

                let listed = storage.keys("folio:").await.unwrap();
                let mut expected: Vec<String> =
                    keys.iter().filter(|k| k.starts_with("folio:")).cloned().collect();
                expected.sort();
                expected.dedup();
                assert_eq!(listed, expected);
            });
        }
    }
}
