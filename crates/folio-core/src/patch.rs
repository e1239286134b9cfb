//! Partial updates: shallow merge of a JSON patch onto a record.

use serde_json::Value;

use crate::error::ValidationError;
use crate::record::{json_kind, Record};
use crate::types::RecordId;
use crate::validation::{identity_of, to_object};

/// Merge `patch` onto `record` and decode the result.
///
/// Top-level fields of the patch replace the record's fields; fields the
/// patch does not mention are kept. The id is immutable: a patch may repeat
/// the current id but never change or clear it.
pub fn merge_patch<T: Record>(record: &T, patch: &Value) -> Result<T, ValidationError> {
    let Value::Object(fields) = patch else {
        return Err(ValidationError::PatchNotAnObject {
            found: json_kind(patch),
        });
    };

    let mut merged = to_object(record)?;
    let current = identity_of(&merged)?;

    if let Some(new_id) = fields.get("id") {
        let unchanged = match (&current, RecordId::from_json(new_id)) {
            (Some(current), Some(new_id)) => *current == new_id,
            _ => false,
        };
        if !unchanged {
            return Err(ValidationError::ImmutableId(
                current.unwrap_or_else(|| RecordId::Str(String::new())),
            ));
        }
    }

    for (field, value) in fields {
        merged.insert(field.clone(), value.clone());
    }

    let updated: T = serde_json::from_value(Value::Object(merged))
        .map_err(|e| ValidationError::Decode(e.to_string()))?;

    if updated.id() != current {
        // A typed record can remap the id field during decoding.
        return Err(ValidationError::ImmutableId(
            current.unwrap_or_else(|| RecordId::Str(String::new())),
        ));
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::JsonRecord;
    use serde_json::json;

    fn faq() -> JsonRecord {
        JsonRecord::try_from(json!({"id": 1, "question": "Q", "answer": "A"})).unwrap()
    }

    #[test]
    fn test_merge_replaces_only_named_fields() {
        let updated = merge_patch(&faq(), &json!({"question": "New Q"})).unwrap();
        assert_eq!(updated.get_str("question"), Some("New Q"));
        assert_eq!(updated.get_str("answer"), Some("A"));
        assert_eq!(updated.id(), Some(RecordId::Num(1)));
    }

    #[test]
    fn test_merge_adds_new_fields() {
        let updated = merge_patch(&faq(), &json!({"order": 3})).unwrap();
        assert_eq!(updated.get("order"), Some(&json!(3)));
    }

    #[test]
    fn test_merge_allows_same_id() {
        assert!(merge_patch(&faq(), &json!({"id": 1, "answer": "B"})).is_ok());
    }

    #[test]
    fn test_merge_rejects_id_change() {
        let err = merge_patch(&faq(), &json!({"id": 2})).unwrap_err();
        assert_eq!(err, ValidationError::ImmutableId(RecordId::Num(1)));

        let err = merge_patch(&faq(), &json!({"id": null})).unwrap_err();
        assert_eq!(err, ValidationError::ImmutableId(RecordId::Num(1)));
    }

    #[test]
    fn test_merge_rejects_non_object_patch() {
        let err = merge_patch(&faq(), &json!("question")).unwrap_err();
        assert_eq!(err, ValidationError::PatchNotAnObject { found: "string" });
    }
}
