//! Event records delivered to configuration listeners.

use config::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of mutation an event describes.
///
/// Each public mutating operation maps to exactly one variant. Detail events
/// fired for the sub-steps of a composite operation reuse these variants for
/// the sub-operation they re-fire (e.g. `clear()` clearing each key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A value was added to a property.
    AddProperty,
    /// A property was overwritten with a new value.
    SetProperty,
    /// A single property was removed.
    ClearProperty,
    /// The whole configuration was cleared.
    Clear,
}

impl EventType {
    /// Canonical upper-case name of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddProperty => "ADD_PROPERTY",
            Self::SetProperty => "SET_PROPERTY",
            Self::ClearProperty => "CLEAR_PROPERTY",
            Self::Clear => "CLEAR",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single notification about a configuration mutation.
///
/// Events are immutable. The `before` flag tells whether the event was fired
/// before the mutation executed or after it completed; both events of a pair
/// carry the same type, property name and value. The after-event describes what
/// was done, not necessarily the resulting state of the store.
///
/// # Examples
///
/// ```rust
/// use config::Value;
/// use configuration_events::event::{ConfigurationEvent, EventType};
///
/// let event = ConfigurationEvent::new(
///     EventType::AddProperty,
///     Some("server.port"),
///     Some(Value::from(8080_i64)),
///     true,
/// );
/// assert!(event.is_before_update());
/// assert_eq!(event.property_name(), Some("server.port"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationEvent {
    event_type: EventType,
    property_name: Option<String>,
    property_value: Option<Value>,
    before: bool,
}

impl ConfigurationEvent {
    /// Create a new event.
    pub fn new(
        event_type: EventType,
        property_name: Option<&str>,
        property_value: Option<Value>,
        before: bool,
    ) -> Self {
        Self {
            event_type,
            property_name: property_name.map(str::to_owned),
            property_value,
            before,
        }
    }

    /// The kind of mutation.
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// The affected property, or `None` for whole-store operations.
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    /// The value involved, or `None` when not applicable (clear operations).
    pub fn property_value(&self) -> Option<&Value> {
        self.property_value.as_ref()
    }

    /// `true` if fired before the mutation, `false` if fired after it.
    pub fn is_before_update(&self) -> bool {
        self.before
    }

    /// Returns the matching after-event for this before-event.
    pub(crate) fn to_after(&self) -> Self {
        Self {
            before: false,
            ..self.clone()
        }
    }
}

impl fmt::Display for ConfigurationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = if self.before { "before" } else { "after" };
        write!(f, "{}[{}]", self.event_type, phase)?;
        if let Some(name) = &self.property_name {
            write!(f, " {}", name)?;
        }
        if let Some(value) = &self.property_value {
            write!(f, " = {}", value)?;
        }
        Ok(())
    }
}
