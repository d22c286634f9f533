//! Local mirror of a database location, kept current from stream events.

use std::cmp::Ordering;

use laundrygo_core::ShopRecord;
use serde_json::{Map, Value};

/// JSON tree mirroring the subscribed location.
///
/// Empty objects never persist: deleting the last child of a node removes the
/// node, matching how the database itself stores data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotTree {
    root: Value,
}

impl SnapshotTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Replace the value at `path`. A `null` value deletes it.
    pub fn put(&mut self, path: &str, data: Value) {
        let segments = split_path(path);
        set_at(&mut self.root, &segments, data);
        if is_empty(&self.root) {
            self.root = Value::Null;
        }
    }

    /// Merge each child of `data` into the value at `path`.
    ///
    /// Child keys may themselves be paths. A non-object patch is ignored.
    pub fn patch(&mut self, path: &str, data: Value) {
        let Value::Object(children) = data else {
            tracing::warn!(path, "ignoring non-object patch payload");
            return;
        };
        let base = split_path(path);
        for (key, value) in children {
            let mut segments = base.clone();
            segments.extend(split_path(&key));
            set_at(&mut self.root, &segments, value);
        }
        if is_empty(&self.root) {
            self.root = Value::Null;
        }
    }

    /// Decode the current tree into shop records.
    #[must_use]
    pub fn records(&self) -> Vec<ShopRecord> {
        decode_records(&self.root)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn is_empty(value: &Value) -> bool {
    value.is_null() || value.as_object().is_some_and(Map::is_empty)
}

fn array_to_object(items: Vec<Value>) -> Map<String, Value> {
    items
        .into_iter()
        .enumerate()
        .filter(|(_, v)| !v.is_null())
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

fn set_at(node: &mut Value, segments: &[&str], data: Value) {
    let Some((key, rest)) = segments.split_first() else {
        *node = data;
        return;
    };

    match node {
        Value::Object(_) => {}
        Value::Array(items) => {
            let items = std::mem::take(items);
            *node = Value::Object(array_to_object(items));
        }
        _ if data.is_null() => return,
        _ => *node = Value::Object(Map::new()),
    }
    let Value::Object(map) = node else {
        return;
    };

    let child = map.entry((*key).to_string()).or_insert(Value::Null);
    set_at(child, rest, data);
    if is_empty(child) {
        map.remove(*key);
    }
}

/// Database key order: keys that are canonical 32-bit integers come first in
/// numeric order, every other key follows in lexicographic order.
fn key_order(a: &str, b: &str) -> Ordering {
    match (integer_key(a), integer_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn integer_key(key: &str) -> Option<i32> {
    let n = key.parse::<i32>().ok()?;
    (n.to_string() == key).then_some(n)
}

/// Decode a collection value into shop records.
///
/// Objects yield one record per child in database key order: integer keys
/// numerically first, then the rest lexicographically.
/// Arrays (written when keys happen to be sequential integers) use the
/// index as id. Children that are not objects are skipped.
#[must_use]
pub fn decode_records(value: &Value) -> Vec<ShopRecord> {
    let decode = |id: &str, payload: &Value| {
        let record = ShopRecord::from_payload(id, payload);
        if record.is_none() {
            tracing::warn!(id, "skipping feed entry that is not an object");
        }
        record
    };

    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| key_order(a.0, b.0));
            entries
                .into_iter()
                .filter_map(|(id, v)| decode(id, v))
                .collect()
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .filter_map(|(i, v)| decode(&i.to_string(), v))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(kind = %json_kind(other), "collection is not an object, ignoring");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
