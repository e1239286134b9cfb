//! The `Record` trait and the dynamic [`JsonRecord`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::types::{IdKind, RecordId};

/// A record that can live in a collection.
///
/// The only structural requirement is a stable identity field. A record
/// without an id is accepted by `add`, which assigns one of kind
/// [`Record::ID_KIND`]; every record stored in a collection has an id.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind of id generated for records added without one.
    const ID_KIND: IdKind = IdKind::Numeric;

    /// The record's identity, if assigned.
    fn id(&self) -> Option<RecordId>;

    /// Assign the record's identity.
    fn set_id(&mut self, id: RecordId);

    /// Explicit ordering field, for collections that have one.
    fn order_key(&self) -> Option<i64> {
        None
    }
}

/// A record with no fixed shape: any JSON object.
///
/// The `id` field is read as the identity; an `order` integer field, when
/// present, is used as the ordering key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonRecord(pub Map<String, Value>);

impl JsonRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

impl TryFrom<Value> for JsonRecord {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ValidationError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }
}

impl Record for JsonRecord {
    fn id(&self) -> Option<RecordId> {
        self.0.get("id").and_then(RecordId::from_json)
    }

    fn set_id(&mut self, id: RecordId) {
        self.0.insert("id".to_string(), id.to_json());
    }

    fn order_key(&self) -> Option<i64> {
        self.0.get("order").and_then(Value::as_i64)
    }
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_record_identity() {
        let mut record = JsonRecord::new().with("title", "Hello");
        assert_eq!(record.id(), None);

        record.set_id(RecordId::Num(9));
        assert_eq!(record.id(), Some(RecordId::Num(9)));
        assert_eq!(record.get("id"), Some(&json!(9)));
    }

    #[test]
    fn test_json_record_rejects_non_objects() {
        let err = JsonRecord::try_from(json!([1, 2])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject { found: "array" });
    }

    #[test]
    fn test_json_record_order_key() {
        let record = JsonRecord::try_from(json!({"id": 1, "order": 4})).unwrap();
        assert_eq!(record.order_key(), Some(4));
    }
}
