//! Error types for Folio Core.

use thiserror::Error;

use crate::types::RecordId;

/// Validation errors raised where records enter a collection.
///
/// A validation failure always aborts the operation; the collection is left
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("record is not serializable: {0}")]
    NotSerializable(String),

    #[error("record must serialize to a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("id field must be an integer or a string, got {0}")]
    InvalidId(String),

    #[error("record is missing its id")]
    MissingId,

    #[error("duplicate id {0}")]
    DuplicateId(RecordId),

    #[error("id of record {0} cannot be changed by an update")]
    ImmutableId(RecordId),

    #[error("patch must be a JSON object, got {found}")]
    PatchNotAnObject { found: &'static str },

    #[error("record could not be decoded: {0}")]
    Decode(String),

    #[error("invalid collection name {name:?}: {reason}")]
    InvalidCollectionName { name: String, reason: &'static str },

    #[error("collection {collection} is already open with a record type other than {requested}")]
    TypeMismatch {
        collection: String,
        requested: &'static str,
    },

    #[error("collection is full: limit of {limit} records reached")]
    CollectionFull { limit: usize },

    #[error("no free id left to assign")]
    IdSpaceExhausted,
}
