//! Keyed access to raw records and dot-path helpers for output maps.

use serde_json::{Map, Value};

/// Read fields off a raw record by key.
///
/// Records enter the pipeline as [`serde_json::Value`]; any other domain type
/// is adapted through `serde::Serialize` when the resource is built.
pub trait RecordAccess {
    /// The value stored under `key`, if the record is keyed and has it.
    fn field(&self, key: &str) -> Option<&Value>;

    /// Whether the record supports keyed access at all.
    fn is_keyed(&self) -> bool;
}

impl RecordAccess for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    fn is_keyed(&self) -> bool {
        self.is_object()
    }
}

impl RecordAccess for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn is_keyed(&self) -> bool {
        true
    }
}

/// Write `value` at a dot-separated path, creating intermediate objects.
///
/// An intermediate that exists but is not an object is replaced.
pub fn set_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                set_path(inner, rest, value);
            }
        }
    }
}

/// Data kept as-is when no transformer applies.
///
/// Objects, lists and null pass through; a scalar becomes a one-element list.
pub fn passthrough(value: Value) -> Value {
    match value {
        Value::Null | Value::Object(_) | Value::Array(_) => value,
        scalar => Value::Array(vec![scalar]),
    }
}

/// View a value as a string-keyed map so children can be composed into it.
///
/// Null becomes an empty map and list entries are keyed by index.
pub fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| (idx.to_string(), item))
            .collect(),
        scalar => {
            let mut map = Map::new();
            map.insert("0".to_string(), scalar);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_field_access() {
        let record = json!({"id": 1, "name": "Bob"});
        assert_eq!(record.field("id"), Some(&json!(1)));
        assert_eq!(record.field("missing"), None);
        assert!(record.is_keyed());
        assert!(!json!([1, 2]).is_keyed());
        assert_eq!(json!("text").field("id"), None);
    }

    #[test]
    fn test_set_path() {
        let mut data = Map::new();
        set_path(&mut data, "test", json!("value"));
        set_path(&mut data, "deep.test", json!("value"));
        set_path(&mut data, "even.deeper.test", json!("value"));
        set_path(&mut data, "even.deeper.test", json!("new_value"));

        assert_eq!(
            Value::Object(data),
            json!({
                "test": "value",
                "deep": {"test": "value"},
                "even": {"deeper": {"test": "new_value"}}
            })
        );
    }

    #[test]
    fn test_set_path_replaces_scalar_intermediate() {
        let mut data = Map::new();
        set_path(&mut data, "user", json!(5));
        set_path(&mut data, "user.id", json!(5));
        assert_eq!(Value::Object(data), json!({"user": {"id": 5}}));
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(passthrough(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(passthrough(json!(null)), json!(null));
        assert_eq!(passthrough(json!("abc")), json!(["abc"]));
        assert_eq!(passthrough(json!(3)), json!([3]));
    }

    #[test]
    fn test_into_object() {
        assert!(into_object(Value::Null).is_empty());
        assert_eq!(
            Value::Object(into_object(json!(["a", "b"]))),
            json!({"0": "a", "1": "b"})
        );
    }
}
