use indexmap::IndexMap;
use serde_json::{Map, Value};

/// One introspection row: column name → JSON value, in the order the
/// database returned the columns.
pub type RowMap = IndexMap<String, Value>;

/// An ordered attribute bag (field spec, index column spec, trigger record).
pub type Attributes = IndexMap<String, Value>;

/// Lower-case every key of `row`, recursing into nested objects and arrays.
///
/// Connection providers disagree on key casing (`Key_name` vs `KEY_NAME`),
/// so rows are passed through this once, at ingestion. When two keys collapse
/// to the same lower-cased key the later one wins.
pub fn lowercase_keys(row: RowMap) -> RowMap {
    row.into_iter()
        .map(|(k, v)| (k.to_lowercase(), lowercase_value(v)))
        .collect()
}

fn lowercase_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_value(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_value).collect()),
        other => other,
    }
}

/// Remove `key` from `row` and return it as a string.
///
/// Numbers and booleans are rendered with their JSON text; `null` and a
/// missing key yield `None`.
pub fn take_string(row: &mut RowMap, key: &str) -> Option<String> {
    match row.shift_remove(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Remove `key` from `row`, returning `Value::Null` when absent.
pub fn take_value(row: &mut RowMap, key: &str) -> Value {
    row.shift_remove(key).unwrap_or(Value::Null)
}

/// Remove `key` from `row` and read it as an unsigned integer.
/// Accepts JSON numbers and numeric strings.
pub fn take_u64(row: &mut RowMap, key: &str) -> Option<u64> {
    match row.shift_remove(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> RowMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn lowercases_top_level_keys_and_keeps_order() {
        let r = lowercase_keys(row(&[
            ("Key_name", json!("PRIMARY")),
            ("Seq_in_index", json!(1)),
            ("Column_name", json!("id")),
        ]));
        let keys: Vec<&str> = r.keys().map(String::as_str).collect();
        assert_eq!(keys, ["key_name", "seq_in_index", "column_name"]);
        assert_eq!(r["key_name"], json!("PRIMARY"));
    }

    #[test]
    fn lowercases_nested_objects_and_arrays() {
        let r = lowercase_keys(row(&[(
            "Meta",
            json!({"Outer": {"INNER": 1}, "List": [{"Deep": true}]}),
        )]));
        assert_eq!(
            r["meta"],
            json!({"outer": {"inner": 1}, "list": [{"deep": true}]})
        );
    }

    #[test]
    fn values_are_not_lowercased() {
        let r = lowercase_keys(row(&[("Field", json!("CreatedAt"))]));
        assert_eq!(r["field"], json!("CreatedAt"));
    }

    #[test]
    fn colliding_keys_keep_the_later_value() {
        let r = lowercase_keys(row(&[("Name", json!("a")), ("NAME", json!("b"))]));
        assert_eq!(r.len(), 1);
        assert_eq!(r["name"], json!("b"));
    }

    #[test]
    fn take_helpers_coerce_and_remove() {
        let mut r = row(&[
            ("seq", json!("3")),
            ("version", json!(10)),
            ("comment", Value::Null),
        ]);
        assert_eq!(take_u64(&mut r, "seq"), Some(3));
        assert_eq!(take_string(&mut r, "version").as_deref(), Some("10"));
        assert_eq!(take_string(&mut r, "comment"), None);
        assert_eq!(take_value(&mut r, "missing"), Value::Null);
        assert!(r.is_empty());
    }
}
