//! # Folio
//!
//! Typed CRUD over named record collections, persisted to durable
//! key-value storage and seeded with defaults exactly once.
//!
//! ## Overview
//!
//! Folio backs a content admin panel: FAQs, blog posts, pages, services,
//! subscribers, site settings. Each collection is a list of records kept as
//! one JSON document in storage. The library provides:
//!
//! - **Records**: any serde type implementing [`Record`], or the dynamic
//!   [`JsonRecord`]
//! - **Collections**: independent, named, typed handles ([`RecordStore`])
//! - **Seeding**: defaults are written on first use only; a collection the
//!   user emptied stays empty across restarts
//! - **Durability**: every mutation is persisted before it becomes visible
//!
//! ## Usage
//!
//! ```rust,no_run
//! use folio::{Registry, RegistryConfig, SqliteStorage};
//! use folio::catalog::Faq;
//!
//! async fn example() -> folio::Result<()> {
//!     let storage = SqliteStorage::open("folio.db")?;
//!     let registry = Registry::init(storage, RegistryConfig::default()).await?;
//!
//!     let faqs = registry
//!         .open("faqs", vec![Faq::new("What is Folio?", "A record store.").with_id(1)])
//!         .await?;
//!
//!     let added = faqs.add(Faq::new("Is it durable?", "Yes.")).await?;
//!     faqs.update(added.id.clone().unwrap(), serde_json::json!({"answer": "Very."}))
//!         .await?;
//!     faqs.remove(1).await?;
//!
//!     registry.dispose().await
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `folio::core` - Record primitives, validation, and the collection catalog
//! - `folio::store` - Storage abstraction, SQLite and in-memory backends

pub mod collection;
pub mod config;
pub mod error;
pub mod registry;

// Re-export component crates
pub use folio_core as core;
pub use folio_store as store;

pub use folio_core::catalog;

// Re-export main types for convenience
pub use collection::{CollectionState, RecordStore};
pub use config::{RegistryConfig, SeedPolicy};
pub use error::{FolioError, Result};
pub use registry::Registry;

// Re-export commonly used component types
pub use folio_core::{
    CollectionName, IdKind, JsonRecord, KnownCollection, Record, RecordId, ValidationError,
};
pub use folio_store::{MemoryStorage, SqliteStorage, Storage, StorageError};
