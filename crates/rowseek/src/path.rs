//! Flattening of nested records into dotted-path rows, and back.
//!
//! A [`FlatRow`] addresses every leaf of a record by the dot-joined keys
//! leading to it (`person.firstName`). Arrays and empty objects are leaves:
//! they are stored whole, so [`unflatten`] restores them exactly. Keys that
//! themselves contain a `.` collide with the separator; that case is not
//! handled.

use serde_json::{Map, Value};

/// A record flattened to `path -> leaf`.
pub type FlatRow = Map<String, Value>;

/// The separator between path segments.
pub const SEPARATOR: char = '.';

/// Flattens a record into a [`FlatRow`].
///
/// Only objects have addressable paths: any other record, like an empty
/// object, flattens to an empty row. The empty string is a valid key at
/// every level (`{"": {"x": 1}}` flattens to `.x`).
pub fn flatten(record: &Value) -> FlatRow {
    let mut acc = Map::new();
    if let Value::Object(map) = record {
        flatten_into(map, None, &mut acc);
    }
    acc
}

fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, acc: &mut FlatRow) {
    for (key, value) in map {
        let path = match prefix {
            None => key.clone(),
            Some(prefix) => format!("{}{}{}", prefix, SEPARATOR, key),
        };
        match value {
            Value::Object(child) if !child.is_empty() => flatten_into(child, Some(&path), acc),
            leaf => {
                acc.insert(path, leaf.clone());
            }
        }
    }
}

/// Rebuilds a nested record from a [`FlatRow`].
///
/// Works on any row, not only the output of a single [`flatten`] call: the
/// keys present are rebuilt and nothing else. When a path runs through a
/// leaf (`a` and `a.b` both present) the deeper path wins.
pub fn unflatten(row: &FlatRow) -> Value {
    let mut root = Map::new();
    for (path, leaf) in row {
        insert_path(&mut root, path, leaf.clone());
    }
    Value::Object(root)
}

fn insert_path(root: &mut Map<String, Value>, path: &str, leaf: Value) {
    let mut segments = path.split(SEPARATOR).peekable();
    let mut current = root;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            // A deeper path already created an object here; keep it.
            match current.get(segment) {
                Some(Value::Object(existing)) if !existing.is_empty() => {}
                _ => {
                    current.insert(segment.to_string(), leaf);
                }
            }
            return;
        }
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }
}

/// Returns the keys of `row` that lie at or below `prefix`
/// (`prefix` itself or `prefix.<anything>`).
pub fn keys_under<'a>(row: &'a FlatRow, prefix: &'a str) -> impl Iterator<Item = &'a String> + 'a {
    row.keys().filter(move |key| is_under(key, prefix))
}

/// Returns `true` if `path` equals `prefix` or descends from it.
pub fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Collects the part of `row` below `prefix`, with the prefix stripped,
/// and rebuilds it as a nested value.
pub fn subtree(row: &FlatRow, prefix: &str) -> Option<Value> {
    let mut sub = Map::new();
    for key in keys_under(row, prefix) {
        let rest = &key[prefix.len()..];
        let rest = rest.strip_prefix(SEPARATOR).unwrap_or(rest);
        sub.insert(rest.to_string(), row[key.as_str()].clone());
    }
    if sub.is_empty() {
        None
    } else {
        Some(unflatten(&sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flatten_nested_objects() {
        let record = json!({
            "age": 17,
            "person": {"firstName": "night", "lastName": "ruc"},
        });
        let row = flatten(&record);
        assert_eq!(row.len(), 3);
        assert_eq!(row["age"], json!(17));
        assert_eq!(row["person.firstName"], json!("night"));
        assert_eq!(row["person.lastName"], json!("ruc"));
    }

    #[test]
    fn arrays_and_empty_objects_are_leaves() {
        let record = json!({"tags": ["a", "b"], "meta": {}, "n": null});
        let row = flatten(&record);
        assert_eq!(row["tags"], json!(["a", "b"]));
        assert_eq!(row["meta"], json!({}));
        assert_eq!(row["n"], json!(null));
        assert_eq!(unflatten(&row), record);
    }

    #[test]
    fn round_trip() {
        let record = json!({
            "a": {"b": {"c": 1, "d": "x"}, "e": true},
            "f": 2.5,
        });
        assert_eq!(unflatten(&flatten(&record)), record);
    }

    #[test]
    fn non_object_record_has_no_paths() {
        assert!(flatten(&json!(42)).is_empty());
        assert!(flatten(&json!(["a"])).is_empty());
        assert!(flatten(&json!({})).is_empty());
        assert_eq!(unflatten(&FlatRow::new()), json!({}));
    }

    #[test]
    fn empty_keys_round_trip() {
        let record = json!({"": 1});
        let row = flatten(&record);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec![""]);
        assert_eq!(unflatten(&row), record);

        let record = json!({"": {"x": 1}, "a": {"": {"": true}, "b": 2}});
        let row = flatten(&record);
        assert_eq!(row[".x"], json!(1));
        assert_eq!(row["a.."], json!(true));
        assert_eq!(row["a.b"], json!(2));
        assert_eq!(unflatten(&row), record);
    }

    #[test]
    fn unflatten_partial_row() {
        let mut row = FlatRow::new();
        row.insert("person.lastName".into(), json!("ruc"));
        row.insert("visits".into(), json!(3));
        assert_eq!(
            unflatten(&row),
            json!({"person": {"lastName": "ruc"}, "visits": 3})
        );
    }

    #[test]
    fn unflatten_deeper_path_wins() {
        let mut row = FlatRow::new();
        row.insert("person".into(), json!("flat"));
        row.insert("person.firstName".into(), json!("night"));
        assert_eq!(unflatten(&row), json!({"person": {"firstName": "night"}}));
    }

    #[test]
    fn prefix_matching() {
        assert!(is_under("person", "person"));
        assert!(is_under("person.firstName", "person"));
        assert!(!is_under("personN.age", "person"));
        assert!(!is_under("per", "person"));
        assert!(!is_under("age", "ag"));
    }

    #[test]
    fn subtree_strips_prefix() {
        let row = flatten(&json!({
            "person": {"firstName": "night", "address": {"city": "x"}},
            "personN": {"age": 3},
        }));
        assert_eq!(
            subtree(&row, "person"),
            Some(json!({"firstName": "night", "address": {"city": "x"}}))
        );
        assert_eq!(subtree(&row, "nobody"), None);
    }
}
