//! The Registry: owner of every open collection.
//!
//! The application creates one registry at startup with [`Registry::init`],
//! hands it (or an `Arc` of it) to the components that need collections, and
//! calls [`Registry::dispose`] on shutdown.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use folio_core::{CollectionName, Record, ValidationError};
use folio_store::Storage;

use crate::collection::{RecordStore, Shared};
use crate::config::RegistryConfig;
use crate::error::{FolioError, Result};

type AnyShared = Arc<dyn Any + Send + Sync>;

/// Registry of named collections over one storage.
///
/// Handles opened for the same name share one state, so a write through
/// one handle is visible through every other.
pub struct Registry {
    storage: Arc<dyn Storage>,
    config: Arc<RegistryConfig>,
    collections: Mutex<HashMap<CollectionName, AnyShared>>,
    disposed: AtomicBool,
}

impl Registry {
    /// Create a registry over `storage`.
    ///
    /// Fails if the storage cannot be read.
    pub async fn init<S: Storage + 'static>(storage: S, config: RegistryConfig) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let existing = storage.keys(&config.key_prefix).await?;

        tracing::info!(
            prefix = %config.key_prefix,
            keys = existing.len(),
            seed_policy = ?config.seed_policy,
            "record registry initialized"
        );

        Ok(Self {
            storage,
            config: Arc::new(config),
            collections: Mutex::new(HashMap::new()),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Open a collection and complete its initial load.
    ///
    /// `defaults` seed the collection when it has never been initialized in
    /// this storage. When the name is already open in this registry, the
    /// existing state is shared and `defaults` are ignored.
    pub async fn open<T: Record>(
        &self,
        name: impl AsRef<str>,
        defaults: Vec<T>,
    ) -> Result<RecordStore<T>> {
        let store = self.open_lazy(name, defaults)?;
        store.load().await?;
        Ok(store)
    }

    /// Open a collection without loading it.
    ///
    /// The handle reports `is_loading()` and shows no items until
    /// [`RecordStore::load`] or the first mutation completes the load.
    pub fn open_lazy<T: Record>(
        &self,
        name: impl AsRef<str>,
        defaults: Vec<T>,
    ) -> Result<RecordStore<T>> {
        if self.is_disposed() {
            return Err(FolioError::Disposed);
        }

        let name = CollectionName::new(name.as_ref())?;
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = collections.get(&name) {
            let shared = Arc::clone(existing)
                .downcast::<Shared<T>>()
                .map_err(|_| ValidationError::TypeMismatch {
                    collection: name.to_string(),
                    requested: type_name::<T>(),
                })?;
            return Ok(RecordStore::new(shared));
        }

        let shared = Arc::new(Shared::new(
            name.clone(),
            Arc::clone(&self.storage),
            Arc::clone(&self.config),
            defaults,
        ));
        collections.insert(name.clone(), Arc::clone(&shared) as AnyShared);
        tracing::debug!(collection = %name, "collection opened");

        Ok(RecordStore::new(shared))
    }

    /// Names of the collections opened so far, sorted.
    pub fn collections(&self) -> Vec<CollectionName> {
        let collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<CollectionName> = collections.keys().cloned().collect();
        names.sort();
        names
    }

    /// Release every open collection and flush storage.
    ///
    /// Further `open` calls fail with [`FolioError::Disposed`]. Handles
    /// already given out keep working against storage. Disposing twice is a
    /// no-op.
    pub async fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let released = {
            let mut collections = self
                .collections
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let released = collections.len();
            collections.clear();
            released
        };

        self.storage.flush().await?;
        tracing::info!(collections = released, "record registry disposed");
        Ok(())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("collections", &self.collections())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::catalog::Faq;
    use folio_core::JsonRecord;
    use folio_store::MemoryStorage;

    async fn registry() -> Registry {
        Registry::init(MemoryStorage::new(), RegistryConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_shares_state() {
        let registry = registry().await;
        let a = registry.open::<Faq>("faqs", vec![]).await.unwrap();
        let b = registry.open::<Faq>("faqs", vec![]).await.unwrap();

        a.add(Faq::new("Q", "A")).await.unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(registry.collections().len(), 1);
    }

    #[tokio::test]
    async fn test_type_mismatch() {
        let registry = registry().await;
        registry.open::<Faq>("faqs", vec![]).await.unwrap();

        let err = registry.open::<JsonRecord>("faqs", vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            FolioError::Validation(ValidationError::TypeMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_name() {
        let registry = registry().await;
        let err = registry.open::<Faq>("bad:name", vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            FolioError::Validation(ValidationError::InvalidCollectionName { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_lazy_reports_loading() {
        let registry = registry().await;
        let faqs = registry
            .open_lazy("faqs", vec![Faq::new("Q", "A").with_id(1)])
            .unwrap();

        assert!(faqs.is_loading());
        assert!(faqs.items().is_empty());

        faqs.load().await.unwrap();
        assert!(!faqs.is_loading());
        assert_eq!(faqs.len(), 1);
    }

    #[tokio::test]
    async fn test_dispose() {
        let registry = registry().await;
        let faqs = registry.open::<Faq>("faqs", vec![]).await.unwrap();

        registry.dispose().await.unwrap();
        registry.dispose().await.unwrap();
        assert!(registry.is_disposed());
        assert!(registry.collections().is_empty());

        let err = registry.open::<Faq>("faqs", vec![]).await.unwrap_err();
        assert!(matches!(err, FolioError::Disposed));
        assert!(!err.is_recoverable());

        // Handles given out before disposal still work
        faqs.add(Faq::new("Q", "A")).await.unwrap();
    }
}
