//! RecordStore: a typed CRUD handle over one named collection.
//!
//! Every handle opened for the same name in a registry shares one state: the
//! committed snapshot of records, the initialization state, and the writer
//! lock. Mutations are serialized by that lock and held across the storage
//! write, so they apply in issuance order. A new snapshot is published only
//! after storage accepted it; on failure the previous snapshot stays.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use tokio::sync::Mutex;

use folio_core::{
    ensure_unique_ids, merge_patch, validate_record, CollectionName, IdGenerator, Record,
    RecordId, ValidationError,
};
use folio_store::{Storage, StorageError, Write};

use crate::config::{RegistryConfig, SeedPolicy};
use crate::error::{FolioError, Result};

/// Initialization state of a collection.
///
/// `Uninitialized → Seeding (only when nothing was ever stored) → Ready`.
/// `Ready` is terminal; mutations keep the collection `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    Uninitialized,
    Seeding,
    Ready,
}

impl CollectionState {
    fn to_u8(self) -> u8 {
        match self {
            CollectionState::Uninitialized => 0,
            CollectionState::Seeding => 1,
            CollectionState::Ready => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => CollectionState::Seeding,
            2 => CollectionState::Ready,
            _ => CollectionState::Uninitialized,
        }
    }
}

/// State shared by every handle on one collection.
pub(crate) struct Shared<T: Record> {
    name: CollectionName,
    data_key: String,
    sentinel_key: String,
    storage: Arc<dyn Storage>,
    config: Arc<RegistryConfig>,
    defaults: Vec<T>,
    items: ArcSwap<Vec<T>>,
    state: AtomicU8,
    writer: Mutex<IdGenerator>,
}

impl<T: Record> Shared<T> {
    pub(crate) fn new(
        name: CollectionName,
        storage: Arc<dyn Storage>,
        config: Arc<RegistryConfig>,
        defaults: Vec<T>,
    ) -> Self {
        Self {
            data_key: config.data_key(&name),
            sentinel_key: config.sentinel_key(&name),
            name,
            storage,
            config,
            defaults,
            items: ArcSwap::from_pointee(Vec::new()),
            state: AtomicU8::new(CollectionState::Uninitialized.to_u8()),
            writer: Mutex::new(IdGenerator::new()),
        }
    }
}

/// A live, typed handle on a named collection.
///
/// Cheap to clone; clones share the same state.
pub struct RecordStore<T: Record> {
    shared: Arc<Shared<T>>,
}

impl<T: Record> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Record> std::fmt::Debug for RecordStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("name", &self.shared.name)
            .field("state", &self.state())
            .field("len", &self.len())
            .finish()
    }
}

impl<T: Record> RecordStore<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    pub fn name(&self) -> &CollectionName {
        &self.shared.name
    }

    pub fn state(&self) -> CollectionState {
        CollectionState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// True until the initial read from durable storage has completed.
    pub fn is_loading(&self) -> bool {
        self.state() != CollectionState::Ready
    }

    /// Snapshot of the records in insertion order.
    ///
    /// Empty while the collection is still loading.
    pub fn items(&self) -> Arc<Vec<T>> {
        self.shared.items.load_full()
    }

    /// Records sorted by their ordering field.
    ///
    /// The sort is stable; records without an ordering field come last in
    /// insertion order.
    pub fn ordered_items(&self) -> Vec<T> {
        let mut items = Vec::clone(&self.items());
        items.sort_by_key(|r| r.order_key().unwrap_or(i64::MAX));
        items
    }

    pub fn get(&self, id: impl Into<RecordId>) -> Option<T> {
        let id = id.into();
        self.items()
            .iter()
            .find(|r| r.id().as_ref() == Some(&id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.items.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Complete the initial load. A no-op once the collection is ready.
    pub async fn load(&self) -> Result<()> {
        let mut ids = self.shared.writer.lock().await;
        self.ensure_loaded(&mut ids).await
    }

    /// Re-read the stored collection, picking up writes made by other
    /// consumers of the same storage. Never reseeds a ready collection.
    pub async fn reload(&self) -> Result<()> {
        let mut guard = self.shared.writer.lock().await;
        let ids = &mut *guard;

        if self.state() != CollectionState::Ready {
            return self.ensure_loaded(ids).await;
        }

        let items = match self.shared.storage.get(&self.shared.data_key).await? {
            Some(raw) => self.decode(&raw)?,
            None => Vec::new(),
        };
        for id in items.iter().filter_map(Record::id) {
            ids.observe(&id);
        }

        tracing::debug!(collection = %self.shared.name, len = items.len(), "collection reloaded");
        self.shared.items.store(Arc::new(items));
        Ok(())
    }

    async fn ensure_loaded(&self, ids: &mut IdGenerator) -> Result<()> {
        if self.state() == CollectionState::Ready {
            return Ok(());
        }

        let storage = &self.shared.storage;
        let stored = storage.get(&self.shared.data_key).await?;
        let seeded = storage.get(&self.shared.sentinel_key).await?;

        let items = match stored {
            Some(raw) => {
                let items = self.decode(&raw)?;
                if seeded.is_none() {
                    storage.set(&self.shared.sentinel_key, &seed_stamp()).await?;
                }
                items
            }
            // Seeded before and the data key was cleared since
            None if seeded.is_some() => Vec::new(),
            None => return self.seed(ids).await,
        };

        if items.is_empty() && self.shared.config.seed_policy == SeedPolicy::WhenEmpty {
            return self.seed(ids).await;
        }

        for id in items.iter().filter_map(Record::id) {
            ids.observe(&id);
        }

        tracing::debug!(collection = %self.shared.name, len = items.len(), "collection loaded");
        self.shared.items.store(Arc::new(items));
        self.set_state(CollectionState::Ready);
        Ok(())
    }

    async fn seed(&self, ids: &mut IdGenerator) -> Result<()> {
        self.set_state(CollectionState::Seeding);

        match self.write_defaults(ids).await {
            Ok(items) => {
                tracing::info!(collection = %self.shared.name, len = items.len(), "collection seeded");
                self.shared.items.store(Arc::new(items));
                self.set_state(CollectionState::Ready);
                Ok(())
            }
            Err(e) => {
                self.set_state(CollectionState::Uninitialized);
                Err(e)
            }
        }
    }

    /// Write the defaults and the sentinel in one atomic batch.
    async fn write_defaults(&self, ids: &mut IdGenerator) -> Result<Vec<T>> {
        let items = self.prepare(self.shared.defaults.clone(), ids)?;
        let raw = encode(&items)?;

        self.shared
            .storage
            .write_batch(&[
                Write::set(self.shared.data_key.as_str(), raw),
                Write::set(self.shared.sentinel_key.as_str(), seed_stamp()),
            ])
            .await?;

        Ok(items)
    }

    fn set_state(&self, state: CollectionState) {
        self.shared.state.store(state.to_u8(), Ordering::Release);
    }

    fn decode(&self, raw: &str) -> Result<Vec<T>> {
        let corrupt = |reason: String| StorageError::Corrupt {
            key: self.shared.data_key.clone(),
            reason,
        };

        let items: Vec<T> = serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
        ensure_unique_ids(&items).map_err(|e| corrupt(e.to_string()))?;
        Ok(items)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a record and persist the collection.
    ///
    /// A record without an id gets a fresh one. Returns the stored record.
    pub async fn add(&self, record: T) -> Result<T> {
        let mut guard = self.shared.writer.lock().await;
        let ids = &mut *guard;
        self.ensure_loaded(ids).await?;

        validate_record(&record)?;
        let current = self.items();
        self.check_limit(current.len() + 1)?;

        let mut record = record;
        match record.id() {
            Some(id) => {
                if position(&current, &id).is_some() {
                    return Err(ValidationError::DuplicateId(id).into());
                }
                ids.observe(&id);
            }
            None => {
                let id = ids.next_id(T::ID_KIND, now_millis(), |candidate| {
                    position(&current, candidate).is_some()
                })?;
                record.set_id(id);
            }
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(record.clone());
        self.commit(next).await?;

        Ok(record)
    }

    /// Merge `patch` (a JSON object) onto the record with the given id.
    ///
    /// Returns the updated record, or `NotFound` with the collection
    /// unchanged when no record has that id.
    pub async fn update<P>(&self, id: impl Into<RecordId>, patch: P) -> Result<T>
    where
        P: Serialize,
    {
        let id = id.into();
        let patch = serde_json::to_value(&patch)
            .map_err(|e| ValidationError::NotSerializable(e.to_string()))?;

        let mut guard = self.shared.writer.lock().await;
        self.ensure_loaded(&mut guard).await?;

        let current = self.items();
        let Some(index) = position(&current, &id) else {
            tracing::warn!(collection = %self.shared.name, %id, "update of missing record");
            return Err(FolioError::NotFound {
                collection: self.shared.name.clone(),
                id,
            });
        };

        let updated = merge_patch(&current[index], &patch)?;
        let mut next = Vec::clone(&current);
        next[index] = updated.clone();
        self.commit(next).await?;

        Ok(updated)
    }

    /// Delete the record with the given id.
    ///
    /// Removing an id that is not present is a no-op returning `false`;
    /// nothing is written.
    pub async fn remove(&self, id: impl Into<RecordId>) -> Result<bool> {
        let id = id.into();

        let mut guard = self.shared.writer.lock().await;
        self.ensure_loaded(&mut guard).await?;

        let current = self.items();
        let Some(index) = position(&current, &id) else {
            tracing::debug!(collection = %self.shared.name, %id, "remove of missing record");
            return Ok(false);
        };

        let mut next = Vec::clone(&current);
        next.remove(index);
        self.commit(next).await?;

        Ok(true)
    }

    /// Replace the whole collection, as one write.
    ///
    /// Records are validated like `add`; missing ids are assigned.
    pub async fn replace_all(&self, records: Vec<T>) -> Result<Arc<Vec<T>>> {
        let mut guard = self.shared.writer.lock().await;
        let ids = &mut *guard;
        self.ensure_loaded(ids).await?;

        let records = self.prepare(records, ids)?;
        self.commit(records).await
    }

    /// Rewrite the collection to the defaults it was opened with.
    pub async fn reset_to_defaults(&self) -> Result<Arc<Vec<T>>> {
        let mut guard = self.shared.writer.lock().await;
        let ids = &mut *guard;
        self.ensure_loaded(ids).await?;

        let records = self.prepare(self.shared.defaults.clone(), ids)?;
        let items = self.commit(records).await?;
        tracing::info!(collection = %self.shared.name, len = items.len(), "collection reset to defaults");
        Ok(items)
    }

    /// Validate a full replacement set and assign missing ids.
    fn prepare(&self, mut records: Vec<T>, ids: &mut IdGenerator) -> Result<Vec<T>> {
        for record in &records {
            validate_record(record)?;
            if let Some(id) = record.id() {
                ids.observe(&id);
            }
        }

        let now = now_millis();
        let mut taken: HashSet<RecordId> = records.iter().filter_map(Record::id).collect();
        for record in records.iter_mut().filter(|r| r.id().is_none()) {
            let id = ids.next_id(T::ID_KIND, now, |candidate| taken.contains(candidate))?;
            taken.insert(id.clone());
            record.set_id(id);
        }

        ensure_unique_ids(&records)?;
        self.check_limit(records.len())?;
        Ok(records)
    }

    fn check_limit(&self, len: usize) -> Result<()> {
        match self.shared.config.max_collection_len {
            Some(limit) if len > limit => Err(ValidationError::CollectionFull { limit }.into()),
            _ => Ok(()),
        }
    }

    /// Persist `next`, then publish it as the current snapshot.
    async fn commit(&self, next: Vec<T>) -> Result<Arc<Vec<T>>> {
        let raw = encode(&next)?;

        if let Err(e) = self.shared.storage.set(&self.shared.data_key, &raw).await {
            tracing::warn!(
                collection = %self.shared.name,
                error = %e,
                "write failed, keeping last committed state"
            );
            return Err(e.into());
        }

        let next = Arc::new(next);
        self.shared.items.store(Arc::clone(&next));
        tracing::debug!(collection = %self.shared.name, len = next.len(), "collection persisted");
        Ok(next)
    }
}

fn position<T: Record>(records: &[T], id: &RecordId) -> Option<usize> {
    records.iter().position(|r| r.id().as_ref() == Some(id))
}

fn encode<T: Record>(records: &[T]) -> std::result::Result<String, ValidationError> {
    serde_json::to_string(records).map_err(|e| ValidationError::NotSerializable(e.to_string()))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Value written under the sentinel key.
fn seed_stamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
