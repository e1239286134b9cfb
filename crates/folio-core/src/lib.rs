//! # Folio Core
//!
//! Pure primitives for the Folio record store: record identities, collection
//! names, validation, patch merging, and id generation.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! JSON-serializable records.
//!
//! ## Key Types
//!
//! - [`Record`] - The trait every stored record type implements
//! - [`RecordId`] - Identity of a record within its collection (number or string)
//! - [`CollectionName`] - Validated name of an independent collection
//! - [`JsonRecord`] - Dynamic record over a JSON object
//! - [`IdGenerator`] - Timestamp-based, strictly increasing id allocation
//!
//! ## Catalog
//!
//! The [`catalog`] module names the collections the admin panel uses and
//! defines typed record shapes for the main ones.

pub mod catalog;
pub mod error;
pub mod ids;
pub mod patch;
pub mod record;
pub mod types;
pub mod validation;

pub use catalog::KnownCollection;
pub use error::ValidationError;
pub use ids::IdGenerator;
pub use patch::merge_patch;
pub use record::{JsonRecord, Record};
pub use types::{CollectionName, IdKind, RecordId};
pub use validation::{ensure_unique_ids, identity_of, to_object, validate_record};
