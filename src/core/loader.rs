//! Configuration loader that merges multiple sources.

use crate::error::{ConfigError, Result};
use crate::sources::{ConfigSource, flatten_properties};
use config::Value;
use std::collections::BTreeMap;

/// Loads and merges properties from multiple sources.
///
/// The loader handles precedence by sorting sources by priority and merging them
/// in order (lower priority first, higher priority sources override). Nested
/// tables are flattened into dotted keys before merging, so an override only
/// replaces the leaf properties it actually defines.
pub struct ConfigLoader {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a configuration source.
    pub fn add_source(&mut self, source: Box<dyn ConfigSource>) {
        self.sources.push(source);
    }

    /// Whether no sources were added.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Load and merge properties from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if any source fails to load.
    pub fn load_properties(&self) -> Result<BTreeMap<String, Value>> {
        let mut properties = BTreeMap::new();

        for source in self.sorted_sources() {
            let values = source.load().map_err(|e| {
                ConfigError::LoadError(format!("Failed to load source '{}': {}", source.name(), e))
            })?;

            let flattened = flatten_properties(values);
            tracing::debug!(source = %source.name(), count = flattened.len(), "source loaded");
            properties.extend(flattened);
        }

        Ok(properties)
    }

    /// Get the list of source names in priority order.
    pub fn source_names(&self) -> Vec<String> {
        self.sorted_sources().iter().map(|s| s.name()).collect()
    }

    fn sorted_sources(&self) -> Vec<&dyn ConfigSource> {
        // Stable sort: equal priorities keep insertion order
        let mut sorted: Vec<&dyn ConfigSource> = self.sources.iter().map(|s| s.as_ref()).collect();
        sorted.sort_by_key(|s| s.priority());
        sorted
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
