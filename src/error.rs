//! Error types for configuration-events.

use crate::event::{EventType, ListenerError, ListenerId};
use std::fmt;

/// Result type alias for configuration-events operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when mutating or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested mutation is not permitted by the store.
    ///
    /// Raised during the pre-check, before any event is fired.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A property value was rejected by the configured validator.
    ///
    /// Raised during the pre-check, before any event is fired.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// A listener failed while an event was being delivered.
    ///
    /// Delivery to the remaining listeners is aborted, and so is the rest of the
    /// mutating call that fired the event.
    #[error(
        "Listener {listener} failed handling {event_type} ({phase}) event: {source}",
        phase = phase_name(.before)
    )]
    ListenerFailed {
        /// The registration that failed
        listener: ListenerId,
        /// Type of the event being delivered
        event_type: EventType,
        /// Phase of the event being delivered
        before: bool,
        /// The error reported by the listener
        #[source]
        source: ListenerError,
    },

    /// Failed to load configuration from a source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Failed to deserialize configuration.
    #[error("Failed to deserialize configuration: {0}")]
    DeserializationError(String),
}

fn phase_name(before: &bool) -> &'static str {
    if *before { "before" } else { "after" }
}

impl ConfigError {
    /// Returns `true` if this error was raised before any event was fired.
    pub fn is_precheck_failure(&self) -> bool {
        matches!(self, Self::InvalidOperation(_) | Self::ValidationError(_))
    }
}

/// Validation error for property values.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific property has an invalid value.
    InvalidProperty {
        /// The property key
        key: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid property error.
    pub fn invalid_property(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidProperty { key, reason } => {
                write!(f, "Property '{}' is invalid: {}", key, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}
