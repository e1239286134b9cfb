//! # Folio Store
//!
//! Durable key-value storage for the Folio record store. Provides a
//! trait-based interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The record store keeps each collection as one JSON document under a
//! string key, plus a small sentinel key. This crate abstracts where those
//! strings live behind the [`Storage`] trait. The durable implementation is
//! [`SqliteStorage`]; [`MemoryStorage`] serves tests and can emulate a
//! storage quota.
//!
//! ## Key Types
//!
//! - [`Storage`] - The async trait for all storage operations
//! - [`SqliteStorage`] - SQLite-backed durable storage
//! - [`MemoryStorage`] - In-memory storage with an optional byte quota
//! - [`Write`] - One entry of an atomic batch
//!
//! ## Usage
//!
//! ```rust,no_run
//! use folio_store::{SqliteStorage, Storage};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let storage = SqliteStorage::open("folio.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let storage = SqliteStorage::open_memory().unwrap();
//!
//!     storage.set("folio:faqs", "[]").await.unwrap();
//!     let raw = storage.get("folio:faqs").await.unwrap();
//!     assert_eq!(raw.as_deref(), Some("[]"));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic batches**: `write_batch` applies every write or none
//! - **Failed writes change nothing**: a quota or database error leaves the
//!   previous value in place, so callers can keep their last committed view

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StorageError};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, Write};
