//! Record validation: serializability and identity checks.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::record::{json_kind, Record};
use crate::types::RecordId;

/// Serialize a value and require a JSON object.
pub fn to_object<T: Serialize + ?Sized>(value: &T) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ValidationError::NotAnObject {
            found: json_kind(&other),
        }),
        Err(e) => Err(ValidationError::NotSerializable(e.to_string())),
    }
}

/// Read the `id` field of a serialized record.
///
/// A missing or `null` id yields `Ok(None)`; anything other than an integer
/// or a string is rejected.
pub fn identity_of(object: &Map<String, Value>) -> Result<Option<RecordId>, ValidationError> {
    match object.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => RecordId::from_json(value)
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidId(value.to_string())),
    }
}

/// Validate a record at the boundary where it enters a collection.
///
/// The record must serialize to a JSON object whose `id`, if present, is an
/// integer or a string.
pub fn validate_record<T: Record>(record: &T) -> Result<(), ValidationError> {
    let object = to_object(record)?;
    identity_of(&object)?;
    Ok(())
}

/// Require every record to carry an id, and no two ids to be equal.
pub fn ensure_unique_ids<T: Record>(records: &[T]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let id = record.id().ok_or(ValidationError::MissingId)?;
        if !seen.insert(id.clone()) {
            return Err(ValidationError::DuplicateId(id));
        }
    }
    Ok(())
}
