//! Serialization utilities
//!
//! This module converts serializable Rust data into metadata values.

use crate::value::{MetadataMap, MetadataValue};
use serde::Serialize;

/// Convert an arbitrary JSON value into the closest metadata variant
pub fn serialize_to_value(value: serde_json::Value) -> MetadataValue {
    match value {
        serde_json::Value::String(s) => {
            if let Ok(id) = uuid::Uuid::parse_str(&s) {
                MetadataValue::Uuid(id)
            } else if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                MetadataValue::Timestamp(dt.with_timezone(&chrono::Utc))
            } else {
                MetadataValue::Text(s)
            }
        }
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetadataValue::Integer(i)
            } else {
                n.as_f64().map(MetadataValue::Float).unwrap_or(MetadataValue::Null)
            }
        }
        serde_json::Value::Bool(b) => MetadataValue::Boolean(b),
        serde_json::Value::Null => MetadataValue::Null,
        serde_json::Value::Array(items) => {
            MetadataValue::Array(items.into_iter().map(serialize_to_value).collect())
        }
        serde_json::Value::Object(map) => MetadataValue::Record(
            map.into_iter()
                .map(|(k, v)| (k, serialize_to_value(v)))
                .collect(),
        ),
    }
}

/// Flatten the top-level fields of a serializable struct into a metadata map.
///
/// Non-object values yield an empty map.
pub fn serialize_to_metadata<T: Serialize>(data: &T) -> MetadataMap {
    match serde_json::to_value(data) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .map(|(key, value)| (key, serialize_to_value(value)))
            .collect(),
        Ok(_) => MetadataMap::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize metadata");
            MetadataMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        route: String,
        status: u16,
        ratio: f64,
        at: String,
    }

    #[test]
    fn test_struct_fields_become_metadata() {
        let sample = Sample {
            route: "/jobs".to_string(),
            status: 503,
            ratio: 0.25,
            at: "2024-05-01T10:00:00Z".to_string(),
        };

        let map = serialize_to_metadata(&sample);
        assert_eq!(map["route"], MetadataValue::Text("/jobs".to_string()));
        assert_eq!(map["status"], MetadataValue::Integer(503));
        assert_eq!(map["ratio"], MetadataValue::Float(0.25));
        assert!(matches!(map["at"], MetadataValue::Timestamp(_)));
    }

    #[test]
    fn test_scalar_yields_empty_map() {
        assert!(serialize_to_metadata(&42).is_empty());
    }
}
