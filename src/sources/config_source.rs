//! Configuration source trait.

use crate::error::Result;
use config::{Value, ValueKind};
use std::collections::HashMap;

/// Trait for configuration sources.
///
/// Implement this trait to feed properties from custom places (remote APIs,
/// databases, key-value stores) into a [`Configuration`](crate::core::Configuration),
/// either at build time or later through
/// [`apply_source`](crate::core::Configuration::apply_source).
pub trait ConfigSource: Send + Sync {
    /// Load configuration as a key-value map.
    ///
    /// Values may be nested tables; they are flattened into dotted keys
    /// (`server.port`) before being stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded or parsed.
    fn load(&self) -> Result<HashMap<String, Value>>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;

    /// Get the priority of this source (higher = takes precedence).
    ///
    /// Default priorities:
    /// - Environment variables: 300
    /// - Default file: 100
    fn priority(&self) -> i32 {
        100
    }
}

/// Flatten nested tables into dotted keys, sorted by key.
///
/// Arrays and scalars are leaves. An empty table produces no properties.
pub(crate) fn flatten_properties(values: HashMap<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    for (key, value) in values {
        flatten_into(key, value, &mut out);
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

fn flatten_into(key: String, value: Value, out: &mut Vec<(String, Value)>) {
    match value.kind {
        ValueKind::Table(table) => {
            for (child, value) in table {
                flatten_into(format!("{}.{}", key, child), value, out);
            }
        }
        kind => out.push((key, Value::new(None, kind))),
    }
}
