//! Configuration change events and the listeners that receive them.
//!
//! Every mutating call on a [`Configuration`](crate::core::Configuration) is
//! bracketed by a pair of [`ConfigurationEvent`]s: one fired immediately before
//! the mutation runs and one fired immediately after. Listeners registered with
//! the configuration's [`ListenerRegistry`] receive both, synchronously and in
//! registration order.

mod listener;
mod registry;
mod types;

pub use listener::{ConfigurationListener, ListenerError};
pub use registry::{ListenerId, ListenerRegistry, Subscription};
pub use types::{ConfigurationEvent, EventType};
