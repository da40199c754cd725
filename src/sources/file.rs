//! File-based configuration source.

use super::ConfigSource;
use crate::error::{ConfigError, Result};
use config::{File, FileFormat, Value};
use std::collections::HashMap;
use std::path::PathBuf;

/// File-based configuration source.
///
/// Loads properties from a YAML, TOML, or JSON file. The format is chosen from
/// the file extension. Nested sections become dotted keys once the source is
/// applied to a configuration (`[server] port = 80` -> `server.port`).
///
/// # Examples
///
/// ```rust,no_run
/// use configuration_events::prelude::*;
/// use configuration_events::sources::FileSource;
///
/// # fn example() -> Result<()> {
/// let config = Configuration::new();
/// config.apply_source(&FileSource::new("config/overrides.toml"))?;
/// # Ok(())
/// # }
/// ```
pub struct FileSource {
    path: PathBuf,
    priority: i32,
}

impl FileSource {
    /// Create a new file source.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            priority: 100,
        }
    }

    /// Set the priority for this source.
    ///
    /// Higher priority sources override lower priority ones.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Resolve the file format from the extension.
    fn format(&self) -> Result<FileFormat> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!(
                    "Unable to determine file format for: {}",
                    self.path.display()
                ))
            })?;

        match extension {
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            "toml" => Ok(FileFormat::Toml),
            "json" => Ok(FileFormat::Json),
            other => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
                other
            ))),
        }
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<HashMap<String, Value>> {
        let format = self.format()?;

        if !self.path.is_file() {
            return Err(ConfigError::LoadError(format!(
                "Configuration file not found: {}",
                self.path.display()
            )));
        }

        config::Config::builder()
            .add_source(File::from(self.path.as_path()).format(format).required(true))
            .build()
            .map_err(|e| {
                ConfigError::LoadError(format!("Failed to read {}: {}", self.path.display(), e))
            })?
            .try_deserialize::<HashMap<String, Value>>()
            .map_err(|e| {
                ConfigError::DeserializationError(format!(
                    "Failed to parse {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
