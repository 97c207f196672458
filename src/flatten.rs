//! Record flattening.
//!
//! Nested objects are folded into a single level by joining key paths with
//! `__`. Arrays are rendered as their compact JSON text since a flat row has
//! no natural representation for them; every other value passes through
//! unchanged. Key order follows the input's iteration order at each level,
//! so the output is deterministic for a fixed input.

use serde_json::{Map, Value};

/// Separator joining nested key paths.
pub const SEPARATOR: &str = "__";

/// Flatten a record into a single-level mapping.
///
/// The top-level value must be a JSON object (the decoder guarantees this
/// for RECORD payloads); anything else yields an empty mapping.
pub fn flatten(record: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    if let Value::Object(fields) = record {
        flatten_into(&mut flat, fields, None);
    }
    flat
}

fn flatten_into(flat: &mut Map<String, Value>, fields: &Map<String, Value>, prefix: Option<&str>) {
    for (key, value) in fields {
        let key = match prefix {
            Some(prefix) => format!("{prefix}{SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(flat, nested, Some(&key)),
            Value::Array(_) => {
                flat.insert(key, Value::String(value.to_string()));
            }
            other => {
                flat.insert(key, other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(flat: &Map<String, Value>) -> Vec<&str> {
        flat.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_flatten_nested_object() {
        let flat = flatten(&json!({"a": {"b": 1, "c": 2}}));

        assert_eq!(keys(&flat), vec!["a__b", "a__c"]);
        assert_eq!(flat["a__b"], json!(1));
        assert_eq!(flat["a__c"], json!(2));
    }

    #[test]
    fn test_flatten_already_flat_is_identity() {
        let record = json!({"id": 1, "name": "alice", "active": true, "score": null});
        let flat = flatten(&record);

        assert_eq!(Value::Object(flat), record);
    }

    #[test]
    fn test_flatten_array_becomes_json_text() {
        let flat = flatten(&json!({"tags": ["a", "b"], "counts": [1, 2, 3]}));

        assert_eq!(flat["tags"], json!(r#"["a","b"]"#));
        assert_eq!(flat["counts"], json!("[1,2,3]"));
    }

    #[test]
    fn test_flatten_deep_nesting() {
        let flat = flatten(&json!({"a": {"b": {"c": {"d": "deep"}}}}));

        assert_eq!(keys(&flat), vec!["a__b__c__d"]);
        assert_eq!(flat["a__b__c__d"], json!("deep"));
    }

    #[test]
    fn test_flatten_preserves_key_order() {
        let flat = flatten(&json!({"z": 1, "a": {"y": 2, "b": 3}, "m": 4}));

        assert_eq!(keys(&flat), vec!["z", "a__y", "a__b", "m"]);
    }

    #[test]
    fn test_flatten_empty_nested_object_contributes_nothing() {
        let flat = flatten(&json!({"a": {}, "b": 1}));

        assert_eq!(keys(&flat), vec!["b"]);
    }

    #[test]
    fn test_flatten_array_of_objects_is_single_column() {
        let flat = flatten(&json!({"items": [{"id": 1}, {"id": 2}]}));

        assert_eq!(keys(&flat), vec!["items"]);
        assert_eq!(flat["items"], json!(r#"[{"id":1},{"id":2}]"#));
    }

    #[test]
    fn test_flatten_non_object_yields_empty() {
        assert!(flatten(&json!([1, 2, 3])).is_empty());
        assert!(flatten(&json!("scalar")).is_empty());
    }
}
