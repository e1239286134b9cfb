//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use folio::catalog::Faq;
use folio::{Registry, RegistryConfig};
use folio_store::MemoryStorage;

/// The FAQ defaults used across tests: five entries with ids 1 through 5.
pub fn faq_defaults() -> Vec<Faq> {
    [
        ("What is Folio?", "A record store for the admin panel."),
        ("Where is my data kept?", "In durable key-value storage."),
        ("Can I delete the sample entries?", "Yes, and they stay deleted."),
        ("How are ids assigned?", "From the clock, always increasing."),
        ("Is there a size limit?", "Only the one storage imposes."),
    ]
    .into_iter()
    .zip(1i64..)
    .map(|((question, answer), id)| Faq::new(question, answer).with_id(id).with_order(id))
    .collect()
}

/// A registry over in-memory storage that outlives the registry.
///
/// [`TestFixture::reopen`] builds a second registry over the same storage,
/// which is how tests simulate an application restart.
pub struct TestFixture {
    pub storage: Arc<MemoryStorage>,
    pub config: RegistryConfig,
    pub registry: Registry,
}

impl TestFixture {
    /// Create a fixture with the default configuration.
    pub async fn new() -> Self {
        Self::with_config(RegistryConfig::default()).await
    }

    pub async fn with_config(config: RegistryConfig) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let registry = Registry::init(Arc::clone(&storage), config.clone())
            .await
            .expect("memory storage is always readable");

        Self {
            storage,
            config,
            registry,
        }
    }

    /// A fresh registry over the same storage, as after a restart.
    pub async fn reopen(&self) -> Registry {
        Registry::init(Arc::clone(&self.storage), self.config.clone())
            .await
            .expect("memory storage is always readable")
    }

    /// Raw stored value under `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        use folio_store::Storage;
        self.storage.get(key).await.expect("memory storage is always readable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::Record;

    #[test]
    fn test_faq_defaults_have_distinct_ids() {
        let defaults = faq_defaults();
        assert_eq!(defaults.len(), 5);

        let mut ids: Vec<_> = defaults.iter().filter_map(Record::id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_reopen_shares_storage() {
        let fixture = TestFixture::new().await;
        let faqs = fixture.registry.open("faqs", faq_defaults()).await.unwrap();
        faqs.remove(1).await.unwrap();

        let restarted = fixture.reopen().await;
        let faqs = restarted.open("faqs", faq_defaults()).await.unwrap();
        assert_eq!(faqs.len(), 4);
        assert!(fixture.raw("folio:faqs:seeded").await.is_some());
    }
}
