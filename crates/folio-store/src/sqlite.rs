//! SQLite implementation of the Storage trait.
//!
//! This is the durable backend for Folio. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StorageError};
use crate::migration;
use crate::traits::{Storage, Write};

/// SQLite-based storage implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StorageError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

const UPSERT: &str = "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();

        self.run(move |conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(StorageError::from)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();

        self.run(move |conn| {
            conn.execute(UPSERT, params![key, value, now_millis()])?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let key = key.to_string();

        self.run(move |conn| {
            let removed = conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(removed > 0)
        })
        .await
    }

    async fn write_batch(&self, writes: &[Write]) -> Result<()> {
        let writes = writes.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let now = now_millis();

            for write in &writes {
                match write {
                    Write::Set { key, value } => {
                        tx.execute(UPSERT, params![key, value, now])?;
                    }
                    Write::Remove { key } => {
                        tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                    }
                }
            }

            // Dropping an uncommitted transaction rolls it back
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.to_string();

        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT key FROM kv WHERE substr(key, 1, ?2) = ?1 ORDER BY key",
            )?;
            let keys = stmt
                .query_map(params![prefix, prefix.chars().count() as i64], |row| {
                    row.get(0)
                })?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(keys)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = SqliteStorage::open_memory().unwrap();

        storage.set("folio:faqs", "[]").await.unwrap();
        assert_eq!(storage.get("folio:faqs").await.unwrap().as_deref(), Some("[]"));

        // Overwrite
        storage.set("folio:faqs", "[{\"id\":1}]").await.unwrap();
        assert_eq!(
            storage.get("folio:faqs").await.unwrap().as_deref(),
            Some("[{\"id\":1}]")
        );

        assert!(storage.remove("folio:faqs").await.unwrap());
        assert!(!storage.remove("folio:faqs").await.unwrap());
        assert_eq!(storage.get("folio:faqs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_batch_and_keys() {
        let storage = SqliteStorage::open_memory().unwrap();
        storage.set("folio:old", "x").await.unwrap();

        storage
            .write_batch(&[
                Write::set("folio:faqs", "[]"),
                Write::set("folio:faqs:seeded", "2024-01-01T00:00:00Z"),
                Write::remove("folio:old"),
                Write::set("elsewhere", "y"),
            ])
            .await
            .unwrap();

        let keys = storage.keys("folio:").await.unwrap();
        assert_eq!(
            keys,
            vec!["folio:faqs".to_string(), "folio:faqs:seeded".to_string()]
        );
        assert_eq!(storage.keys("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.db");

        {
            let storage = SqliteStorage::open(&path).unwrap();
            storage.set("folio:pages", "[{\"id\":7}]").await.unwrap();
        }

        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(
            storage.get("folio:pages").await.unwrap().as_deref(),
            Some("[{\"id\":7}]")
        );
    }
}
