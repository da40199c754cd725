//! # configuration-events
//!
//! Change notifications for a mutable, hierarchical configuration store.
//!
//! ## Overview
//!
//! Every mutating call on a [`Configuration`](core::Configuration) is announced
//! to registered listeners as a pair of events:
//! - a *before* event, fired right before the mutation executes
//! - an *after* event with the same type, property name and value, fired once
//!   the mutation is done
//!
//! Delivery is synchronous, in registration order. When *detail events* are
//! enabled, composite operations (overwriting a property, clearing the whole
//! store, adding a list) additionally announce their sub-operations as nested
//! pairs, always strictly inside the enclosing pair.
//!
//! ## Quick Start
//!
//! ```rust
//! use configuration_events::prelude::*;
//!
//! # fn example() -> Result<()> {
//! let config = Configuration::new();
//! config.add_property("event.property", "existing value")?;
//!
//! let _subscription = config.subscribe(|event: &ConfigurationEvent| {
//!     let phase = if event.is_before_update() { "about to" } else { "did" };
//!     println!("{} {} {:?}", phase, event.event_type(), event.property_name());
//! });
//!
//! config.set_property("event.property", "a value")?;
//! config.clear_property("event.property")?;
//!
//! config.set_detail_events(true);
//! config.clear()?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Before/after pairs**: each public mutation maps to exactly one event type
//! - **Detail events**: opt-in nested events for sub-operations
//! - **Snapshot fan-out**: listeners may add or remove listeners while handling
//!   an event without disturbing the delivery in progress
//! - **Atomic pre-checks**: invalid operations fail before any event fires
//! - **Config sources**: seed or update the store from YAML/TOML/JSON files and
//!   environment variables
//!
//! ## Feature Flags
//!
//! - `metrics`: OpenTelemetry event metrics via [`EventMetrics`](metrics::EventMetrics)

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod event;
pub mod sources;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{Configuration, ConfigurationBuilder, PropertyValidator};
    pub use crate::error::{ConfigError, Result, ValidationError};
    pub use crate::event::{
        ConfigurationEvent, ConfigurationListener, EventType, ListenerError, ListenerId,
        Subscription,
    };
}
