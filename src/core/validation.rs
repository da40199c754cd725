//! Property validation support.

use crate::error::ValidationError;
use config::Value;

/// Trait for validating property values before they are stored.
///
/// A validator runs during the pre-check of every add and set operation. A
/// rejected value fails the call before any event is fired.
///
/// Any `Fn(&str, &Value) -> Result<(), ValidationError>` closure is a validator.
///
/// # Examples
///
/// ```rust
/// use config::Value;
/// use configuration_events::core::PropertyValidator;
/// use configuration_events::error::ValidationError;
///
/// struct PortValidator;
///
/// impl PropertyValidator for PortValidator {
///     fn validate(&self, key: &str, value: &Value) -> Result<(), ValidationError> {
///         if key.ends_with(".port") {
///             let port = value
///                 .clone()
///                 .into_int()
///                 .map_err(|e| ValidationError::invalid_property(key, e.to_string()))?;
///             if port < 1024 {
///                 return Err(ValidationError::invalid_property(
///                     key,
///                     "must be >= 1024 (privileged ports require root)",
///                 ));
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PropertyValidator: Send + Sync {
    /// Validate a value about to be stored under `key`.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self, key: &str, value: &Value) -> Result<(), ValidationError>;
}

impl<F> PropertyValidator for F
where
    F: Fn(&str, &Value) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, key: &str, value: &Value) -> Result<(), ValidationError> {
        self(key, value)
    }
}
