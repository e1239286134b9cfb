//! Strong type definitions for Folio.
//!
//! Identities and collection names are newtypes so they cannot be mixed up
//! with arbitrary strings at compile time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Identity of a record within its collection.
///
/// Collections use either numeric or string ids. Serialized untagged, so the
/// stored JSON holds a plain number or a plain string. `Num(3)` and
/// `Str("3")` are distinct ids.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(i64),
    Str(String),
}

impl RecordId {
    /// Read an id out of a JSON value.
    ///
    /// Returns `None` for anything that is not an integer or a string.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Num),
            Value::String(s) => Some(RecordId::Str(s.clone())),
            _ => None,
        }
    }

    /// Convert into a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            RecordId::Num(n) => Value::from(*n),
            RecordId::Str(s) => Value::from(s.as_str()),
        }
    }

    /// Numeric interpretation of this id, if it has one.
    ///
    /// String ids made only of digits count too, since generated text ids
    /// are decimal timestamps.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RecordId::Num(n) => Some(*n),
            RecordId::Str(s) => s.parse().ok(),
        }
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Num(n) => write!(f, "RecordId({})", n),
            RecordId::Str(s) => write!(f, "RecordId({:?})", s),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Num(n) => write!(f, "{}", n),
            RecordId::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Num(n)
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        RecordId::Num(n.into())
    }
}

impl From<u32> for RecordId {
    fn from(n: u32) -> Self {
        RecordId::Num(n.into())
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Str(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Str(s)
    }
}

impl From<&RecordId> for RecordId {
    fn from(id: &RecordId) -> Self {
        id.clone()
    }
}

/// Flavour of ids a record type generates when the caller supplies none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdKind {
    /// Integer ids (`RecordId::Num`).
    #[default]
    Numeric,
    /// Decimal string ids (`RecordId::Str`).
    Text,
}

impl IdKind {
    /// Build an id of this kind from a numeric value.
    pub fn make(self, value: i64) -> RecordId {
        match self {
            IdKind::Numeric => RecordId::Num(value),
            IdKind::Text => RecordId::Str(value.to_string()),
        }
    }
}

/// Maximum length of a collection name, in characters.
pub const MAX_COLLECTION_NAME_LEN: usize = 128;

/// Name of an independent collection, e.g. `"blogPosts"`.
///
/// Non-empty, at most [`MAX_COLLECTION_NAME_LEN`] characters, no control
/// characters and no `:` (reserved as the storage-key separator).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(String);

impl CollectionName {
    /// Validate and wrap a collection name.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name.chars().count() > MAX_COLLECTION_NAME_LEN {
            Some("longer than 128 characters")
        } else if name.contains(':') {
            Some("must not contain ':'")
        } else if name.chars().any(char::is_control) {
            Some("must not contain control characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ValidationError::InvalidCollectionName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Wrap a name already known to satisfy the rules.
    pub(crate) fn from_known(name: &'static str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CollectionName({:?})", self.0)
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CollectionName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CollectionName {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for CollectionName {
    type Error = ValidationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CollectionName> for String {
    fn from(name: CollectionName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_json_forms() {
        assert_eq!(RecordId::from_json(&json!(7)), Some(RecordId::Num(7)));
        assert_eq!(
            RecordId::from_json(&json!("abc")),
            Some(RecordId::Str("abc".into()))
        );
        assert_eq!(RecordId::from_json(&json!(1.5)), None);
        assert_eq!(RecordId::from_json(&json!(null)), None);
    }

    #[test]
    fn test_record_id_serializes_untagged() {
        assert_eq!(serde_json::to_string(&RecordId::Num(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&RecordId::Str("x".into())).unwrap(),
            "\"x\""
        );
        let parsed: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, RecordId::Num(42));
    }

    #[test]
    fn test_numeric_and_text_ids_differ() {
        assert_ne!(RecordId::from(3), RecordId::from("3"));
        assert_eq!(RecordId::from("3").as_i64(), Some(3));
    }

    #[test]
    fn test_collection_name_rules() {
        assert!(CollectionName::new("blogPosts").is_ok());
        assert!(CollectionName::new("newsletter-subscribers").is_ok());
        assert!(CollectionName::new("").is_err());
        assert!(CollectionName::new("a:b").is_err());
        assert!(CollectionName::new("tab\tname").is_err());
        assert!(CollectionName::new("x".repeat(129)).is_err());
    }

    #[test]
    fn test_collection_name_serde_validates() {
        let ok: CollectionName = serde_json::from_str("\"faqs\"").unwrap();
        assert_eq!(ok.as_str(), "faqs");
        assert!(serde_json::from_str::<CollectionName>("\"bad:name\"").is_err());
    }
}
