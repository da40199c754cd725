//! In-memory multi-valued property storage.

use config::{Value, ValueKind};
use std::collections::BTreeMap;

/// Storage backing a [`Configuration`](super::Configuration).
///
/// Keys are hierarchical dotted paths (`server.port`). A key holds one or more
/// values; adding to an existing key appends. The store itself knows nothing
/// about events.
#[derive(Debug, Clone, Default)]
pub(crate) struct PropertyStore {
    entries: BTreeMap<String, Vec<Value>>,
}

impl PropertyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a single value to `key`.
    pub(crate) fn add_value(&mut self, key: &str, value: Value) {
        self.entries.entry(key.to_owned()).or_default().push(value);
    }

    /// Remove `key`, returning how many values it held.
    pub(crate) fn remove(&mut self, key: &str) -> usize {
        self.entries.remove(key).map_or(0, |values| values.len())
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// The value of `key`: the single value, or an array when several are stored.
    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        match self.entries.get(key)?.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(Value::from(many.to_vec())),
        }
    }

    pub(crate) fn get_all(&self, key: &str) -> Vec<Value> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Keys equal to `prefix` or nested below it (`prefix.*`).
    pub(crate) fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| {
                key.strip_prefix(prefix)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
            })
            .cloned()
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a value into the elements that get stored: lists are stored element
/// by element, everything else as a single value. Elements are stored
/// without the origin of the source they came from.
pub(crate) fn split_values(value: &Value) -> Vec<Value> {
    match &value.kind {
        ValueKind::Array(items) => items
            .iter()
            .map(|item| Value::new(None, item.kind.clone()))
            .collect(),
        _ => vec![value.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_appends() {
        let mut store = PropertyStore::new();
        store.add_value("db.hosts", Value::from("a"));
        store.add_value("db.hosts", Value::from("b"));

        assert_eq!(store.get_all("db.hosts"), vec![Value::from("a"), Value::from("b")]);
        assert_eq!(
            store.get("db.hosts"),
            Some(Value::from(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn test_single_value() {
        let mut store = PropertyStore::new();
        store.add_value("server.port", Value::from(8080_i64));
        assert_eq!(store.get("server.port"), Some(Value::from(8080_i64)));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = PropertyStore::new();
        store.add_value("a", Value::from(1_i64));
        store.add_value("a", Value::from(2_i64));
        store.add_value("b", Value::from(3_i64));

        assert_eq!(store.remove("a"), 2);
        assert_eq!(store.remove("a"), 0);
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_keys_with_prefix() {
        let mut store = PropertyStore::new();
        store.add_value("server", Value::from("x"));
        store.add_value("server.port", Value::from(1_i64));
        store.add_value("server.host", Value::from("h"));
        store.add_value("serverless", Value::from(true));

        assert_eq!(
            store.keys_with_prefix("server"),
            vec!["server", "server.host", "server.port"]
        );
    }

    #[test]
    fn test_split_values() {
        let list = Value::from(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(split_values(&list).len(), 2);
        assert_eq!(split_values(&Value::from("a")), vec![Value::from("a")]);
    }
}
