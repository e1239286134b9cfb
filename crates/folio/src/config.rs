//! Registry configuration.

use serde::{Deserialize, Serialize};

use folio_core::CollectionName;

/// When a collection is populated from its defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Seed only when the collection has never been initialized in this
    /// storage. An emptied collection stays empty.
    #[default]
    Once,
    /// Seed whenever the stored collection is empty, including after every
    /// record was removed.
    WhenEmpty,
}

/// Configuration for the [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Prefix of every storage key the registry writes.
    pub key_prefix: String,
    /// Seeding behaviour for newly opened collections.
    pub seed_policy: SeedPolicy,
    /// Upper bound on records per collection, if any.
    pub max_collection_len: Option<usize>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            key_prefix: "folio:".to_string(),
            seed_policy: SeedPolicy::Once,
            max_collection_len: None,
        }
    }
}

impl RegistryConfig {
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_seed_policy(mut self, policy: SeedPolicy) -> Self {
        self.seed_policy = policy;
        self
    }

    pub fn with_max_collection_len(mut self, limit: usize) -> Self {
        self.max_collection_len = Some(limit);
        self
    }

    /// Key holding the collection's JSON array.
    pub fn data_key(&self, name: &CollectionName) -> String {
        format!("{}{}", self.key_prefix, name)
    }

    /// Key marking the collection as initialized.
    pub fn sentinel_key(&self, name: &CollectionName) -> String {
        format!("{}{}:seeded", self.key_prefix, name)
    }
}
