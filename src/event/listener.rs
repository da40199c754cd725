//! The listener capability.

use super::ConfigurationEvent;

/// Error reported by a listener that could not handle an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    /// Create a listener error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An observer of configuration mutations.
///
/// Listeners are called synchronously on the thread performing the mutation,
/// once for every event fired while they are registered. A listener returning
/// an error aborts delivery to the remaining listeners and the rest of the
/// mutating call; the error is surfaced to the caller of that call.
///
/// Any `Fn(&ConfigurationEvent)` closure is an infallible listener.
///
/// # Examples
///
/// ```rust
/// use configuration_events::event::{ConfigurationEvent, ConfigurationListener, ListenerError};
///
/// struct RejectClear;
///
/// impl ConfigurationListener for RejectClear {
///     fn configuration_changed(&self, event: &ConfigurationEvent) -> Result<(), ListenerError> {
///         if event.property_name().is_none() && event.is_before_update() {
///             return Err(ListenerError::new("clearing is not allowed here"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ConfigurationListener: Send + Sync {
    /// Handle a single event.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the operation that fired the event.
    fn configuration_changed(&self, event: &ConfigurationEvent) -> Result<(), ListenerError>;
}

impl<F> ConfigurationListener for F
where
    F: Fn(&ConfigurationEvent) + Send + Sync,
{
    fn configuration_changed(&self, event: &ConfigurationEvent) -> Result<(), ListenerError> {
        self(event);
        Ok(())
    }
}
