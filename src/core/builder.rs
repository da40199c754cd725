//! Builder for constructing Configuration instances.

use crate::core::store::{PropertyStore, split_values};
use crate::core::{ConfigLoader, Configuration, PropertyValidator};
use crate::error::{Result, ValidationError};
use crate::event::ConfigurationListener;
use crate::sources::{ConfigSource, EnvSource, FileSource};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for constructing a `Configuration` instance.
///
/// Provides a fluent interface for loading initial properties and wiring
/// listeners. Initial properties are loaded before any listener is attached,
/// so building fires no events.
///
/// # Examples
///
/// ```rust,no_run
/// use configuration_events::prelude::*;
///
/// # fn example() -> Result<()> {
/// let config = Configuration::builder()
///     .with_file("config/default.yaml")
///     .with_file("config/production.yaml")
///     .with_env_overrides("APP", "__")
///     .with_detail_events(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigurationBuilder {
    file_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
    env_separator: Option<String>,
    custom_sources: Vec<Box<dyn ConfigSource>>,
    validator: Option<Arc<dyn PropertyValidator>>,
    listeners: Vec<Arc<dyn ConfigurationListener>>,
    detail_events: bool,
}

impl ConfigurationBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            file_paths: Vec::new(),
            env_prefix: None,
            env_separator: None,
            custom_sources: Vec::new(),
            validator: None,
            listeners: Vec::new(),
            detail_events: false,
        }
    }

    /// Add a file source with automatic format detection.
    ///
    /// Supported formats: YAML (.yaml, .yml), TOML (.toml), JSON (.json)
    ///
    /// Files are added in the order they are specified. Later files have higher
    /// priority and will override earlier files.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.push(path.into());
        self
    }

    /// Add environment variable source with custom prefix.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "APP")
    /// * `separator` - Separator for nested keys (e.g., "__" for APP_DB__HOST)
    ///
    /// Environment variables have the highest priority by default (300).
    pub fn with_env_overrides(mut self, prefix: &str, separator: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.env_separator = Some(separator.to_string());
        self
    }

    /// Add a custom configuration source.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        self.custom_sources.push(Box::new(source));
        self
    }

    /// Set the validator applied to every value, both at build time and on
    /// every later add or set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use config::Value;
    /// use configuration_events::prelude::*;
    ///
    /// let builder = Configuration::builder().with_validation(|key: &str, value: &Value| {
    ///     if key == "server.port" && value.clone().into_int().map_or(true, |p| p < 1024) {
    ///         return Err(ValidationError::invalid_property(key, "must be >= 1024"));
    ///     }
    ///     Ok(())
    /// });
    /// let config = builder.build().unwrap();
    /// assert!(config.set_property("server.port", 80_i64).is_err());
    /// ```
    pub fn with_validation<V>(mut self, validator: V) -> Self
    where
        V: PropertyValidator + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Register a listener on the built configuration.
    pub fn with_listener(mut self, listener: Arc<dyn ConfigurationListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Enable or disable detail events on the built configuration.
    pub fn with_detail_events(mut self, enabled: bool) -> Self {
        self.detail_events = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// This performs the initial load from all sources and validates the result.
    /// With no sources the configuration starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Initial configuration load fails
    /// - Validation fails
    pub fn build(self) -> Result<Configuration> {
        let mut loader = ConfigLoader::new();

        // Add file sources with increasing priority
        for (index, path) in self.file_paths.iter().enumerate() {
            let priority = 100 + (index as i32 * 10); // 100, 110, 120, etc.
            let source = FileSource::new(path).with_priority(priority);
            loader.add_source(Box::new(source));
        }

        // Add custom sources
        for source in self.custom_sources {
            loader.add_source(source);
        }

        // Add environment variable source (highest priority)
        if let (Some(prefix), Some(separator)) = (self.env_prefix, self.env_separator) {
            let env_source = EnvSource::new(prefix, separator);
            loader.add_source(Box::new(env_source));
        }

        let properties = if loader.is_empty() {
            Default::default()
        } else {
            tracing::debug!(sources = ?loader.source_names(), "loading initial properties");
            loader.load_properties()?
        };

        let mut store = PropertyStore::new();
        let mut failures = Vec::new();
        for (key, value) in properties {
            for element in split_values(&value) {
                if let Some(validator) = &self.validator {
                    if let Err(e) = validator.validate(&key, &element) {
                        failures.push(e);
                        continue;
                    }
                }
                store.add_value(&key, element);
            }
        }
        if let Some(error) = collect_failures(failures) {
            tracing::warn!(%error, "initial properties rejected");
            return Err(error.into());
        }
        tracing::debug!(properties = store.len(), "initial properties loaded");

        let config = Configuration::with_parts(store, self.validator);
        for listener in self.listeners {
            config.add_listener(listener);
        }
        config.set_detail_events(self.detail_events);

        Ok(config)
    }
}

fn collect_failures(mut failures: Vec<ValidationError>) -> Option<ValidationError> {
    match failures.len() {
        0 => None,
        1 => failures.pop(),
        _ => Some(ValidationError::Multiple(failures)),
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    /// Create a new builder for constructing a configuration.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }
}
