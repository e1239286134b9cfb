//! # Folio Testkit
//!
//! Testing utilities for the Folio record store.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A registry over shared in-memory storage that can be
//!   "restarted" to check what survives a reload
//! - **Fault injection**: [`FaultyStorage`] wraps any storage and fails
//!   writes on demand
//! - **Generators**: Proptest strategies for records and operation sequences
//!
//! ## Test Fixtures
//!
//! ```rust
//! use folio_testkit::fixtures::{faq_defaults, TestFixture};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let fixture = TestFixture::new().await;
//!     let faqs = fixture.registry.open("faqs", faq_defaults()).await.unwrap();
//!     assert_eq!(faqs.len(), 5);
//!
//!     // A fresh registry over the same storage sees the same data
//!     let restarted = fixture.reopen().await;
//!     let faqs = restarted.open("faqs", faq_defaults()).await.unwrap();
//!     assert_eq!(faqs.len(), 5);
//! });
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use folio_testkit::generators::ops;
//!
//! proptest! {
//!     #[test]
//!     fn ids_stay_unique(ops in ops(32)) {
//!         // apply ops, check invariants
//!     }
//! }
//! ```

pub mod faulty;
pub mod fixtures;
pub mod generators;

pub use faulty::FaultyStorage;
pub use fixtures::{faq_defaults, TestFixture};
pub use generators::{ops, Op};
