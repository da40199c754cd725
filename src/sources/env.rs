//! Environment variable configuration source.

use super::ConfigSource;
use crate::error::{ConfigError, Result};
use config::{Environment, Value};
use std::collections::HashMap;

/// Environment variable configuration source.
///
/// Loads properties from environment variables with a specified prefix and
/// separator for nested keys. `APP_SERVER__PORT=8080` with prefix `APP` and
/// separator `__` becomes the property `server.port`.
///
/// # Examples
///
/// ```rust
/// use configuration_events::sources::EnvSource;
///
/// // APP_SERVER__PORT=8080 -> server.port = 8080
/// let source = EnvSource::new("APP", "__");
/// ```
pub struct EnvSource {
    prefix: String,
    separator: String,
    priority: i32,
}

impl EnvSource {
    /// Create a new environment variable source.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "APP")
    /// * `separator` - Separator for nested keys (e.g., "__" for APP_DB__HOST)
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
            priority: 300, // Env vars have highest priority by default
        }
    }

    /// Set the priority for this source.
    ///
    /// Higher priority sources override lower priority ones.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl ConfigSource for EnvSource {
    fn load(&self) -> Result<HashMap<String, Value>> {
        let env_source = Environment::with_prefix(&self.prefix)
            .prefix_separator("_")
            .separator(&self.separator)
            .try_parsing(true); // Try to parse numbers, booleans, etc.

        let config_builder = config::Config::builder()
            .add_source(env_source)
            .build()
            .map_err(|e| {
                ConfigError::LoadError(format!("Failed to load environment variables: {}", e))
            })?;

        config_builder
            .try_deserialize::<HashMap<String, Value>>()
            .map_err(|e| {
                ConfigError::DeserializationError(format!(
                    "Failed to parse environment variables: {}",
                    e
                ))
            })
    }

    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
