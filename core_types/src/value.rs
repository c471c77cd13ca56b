//! Metadata value definitions
//!
//! This module provides the dynamic value union used where metric
//! metadata and alert details are genuinely free-form.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Free-form metadata map keyed by field name
pub type MetadataMap = HashMap<String, MetadataValue>;

/// Runtime value carried in metadata and alert details.
///
/// Untagged variants are tried in order, so the string forms that parse
/// as a UUID or an RFC 3339 timestamp come before plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Uuid(Uuid),
    Timestamp(chrono::DateTime<chrono::Utc>),
    Text(String),
    Array(Vec<MetadataValue>),
    Record(HashMap<String, MetadataValue>),
}

impl MetadataValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Integer(i) => Some(*i as f64),
            MetadataValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<String> for MetadataValue {
    fn from(val: String) -> Self {
        MetadataValue::Text(val)
    }
}

impl From<&str> for MetadataValue {
    fn from(val: &str) -> Self {
        MetadataValue::Text(val.to_string())
    }
}

impl From<i32> for MetadataValue {
    fn from(val: i32) -> Self {
        MetadataValue::Integer(val as i64)
    }
}

impl From<i64> for MetadataValue {
    fn from(val: i64) -> Self {
        MetadataValue::Integer(val)
    }
}

impl From<u32> for MetadataValue {
    fn from(val: u32) -> Self {
        MetadataValue::Integer(val as i64)
    }
}

impl From<u64> for MetadataValue {
    fn from(val: u64) -> Self {
        // Values beyond i64 keep their magnitude as a float
        i64::try_from(val)
            .map(MetadataValue::Integer)
            .unwrap_or(MetadataValue::Float(val as f64))
    }
}

impl From<usize> for MetadataValue {
    fn from(val: usize) -> Self {
        MetadataValue::from(val as u64)
    }
}

impl From<f64> for MetadataValue {
    fn from(val: f64) -> Self {
        MetadataValue::Float(val)
    }
}

impl From<bool> for MetadataValue {
    fn from(val: bool) -> Self {
        MetadataValue::Boolean(val)
    }
}

impl From<Uuid> for MetadataValue {
    fn from(val: Uuid) -> Self {
        MetadataValue::Uuid(val)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for MetadataValue {
    fn from(val: chrono::DateTime<chrono::Utc>) -> Self {
        MetadataValue::Timestamp(val)
    }
}

impl From<serde_json::Value> for MetadataValue {
    fn from(val: serde_json::Value) -> Self {
        crate::serialize::serialize_to_value(val)
    }
}

impl<T> From<Option<T>> for MetadataValue
where
    T: Into<MetadataValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => MetadataValue::Null,
        }
    }
}

impl<T> From<Vec<T>> for MetadataValue
where
    T: Into<MetadataValue>,
{
    fn from(val: Vec<T>) -> Self {
        MetadataValue::Array(val.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_views() {
        assert_eq!(MetadataValue::from(42i64).as_f64(), Some(42.0));
        assert_eq!(MetadataValue::from(0.5).as_f64(), Some(0.5));
        assert_eq!(MetadataValue::from("x").as_f64(), None);
        assert_eq!(MetadataValue::from(u64::MAX).as_f64(), Some(u64::MAX as f64));
    }

    #[test]
    fn test_typed_strings_survive_round_trip() {
        let id = Uuid::new_v4();
        let at = chrono::DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let values = vec![
            MetadataValue::Uuid(id),
            MetadataValue::Timestamp(at),
            MetadataValue::Text("/jobs".to_string()),
            MetadataValue::Integer(7),
            MetadataValue::Float(0.5),
        ];

        let json = serde_json::to_string(&values).unwrap();
        let parsed: Vec<MetadataValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, values);
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<String> = None;
        assert_eq!(MetadataValue::from(none), MetadataValue::Null);
        assert_eq!(
            MetadataValue::from(Some("ok")),
            MetadataValue::Text("ok".to_string())
        );
    }
}
