//! Listener registration and event fan-out.

use super::{ConfigurationEvent, ConfigurationListener};
use crate::error::{ConfigError, Result};
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Identifier of a single listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Build an id from its raw value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value of this id.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    listener: Arc<dyn ConfigurationListener>,
}

/// Shared registry state.
///
/// The listener list is copy-on-write: mutations publish a new `Vec`, so a
/// `fire` in progress keeps delivering to the snapshot it started with.
struct RegistryShared {
    listeners: ArcSwap<Vec<ListenerEntry>>,
    next_id: AtomicU64,
}

impl RegistryShared {
    fn remove_id(&self, id: ListenerId) -> bool {
        let previous = self.listeners.rcu(|current| {
            current
                .iter()
                .filter(|entry| entry.id != id)
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().any(|entry| entry.id == id)
    }
}

/// Handle for a closure subscription that unsubscribes when dropped.
///
/// Dropping the handle removes the registration synchronously; a `fire`
/// already in progress still delivers to it.
pub struct Subscription {
    id: ListenerId,
    registry: Weak<RegistryShared>,
}

impl Subscription {
    /// The id of the underlying registration.
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove_id(self.id);
            tracing::debug!(listener = %self.id, "subscription dropped");
        }
    }
}

/// Ordered collection of listeners owned by one event source.
///
/// Delivery order is registration order. Registering the same listener twice
/// is allowed and gives it two independent registrations, each receiving its
/// own copy of every event.
///
/// # Examples
///
/// ```rust
/// use configuration_events::event::{ConfigurationEvent, ListenerRegistry};
///
/// let registry = ListenerRegistry::new();
/// let handle = registry.subscribe(|_: &ConfigurationEvent| {});
/// assert_eq!(registry.len(), 1);
///
/// // Unsubscribe by dropping the handle
/// drop(handle);
/// assert!(registry.is_empty());
/// ```
///
/// Events are only fired by the owning [`Configuration`](crate::core::Configuration),
/// always as before/after pairs around a mutation:
///
/// ```compile_fail
/// use configuration_events::event::{ConfigurationEvent, EventType, ListenerRegistry};
///
/// let registry = ListenerRegistry::new();
/// let event = ConfigurationEvent::new(EventType::Clear, None, None, true);
/// registry.fire(&event).unwrap();
/// ```
pub struct ListenerRegistry {
    inner: Arc<RegistryShared>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryShared {
                listeners: ArcSwap::from_pointee(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Register a listener.
    ///
    /// The listener receives every event fired after this call returns.
    pub fn add_listener(&self, listener: Arc<dyn ConfigurationListener>) -> ListenerId {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = ListenerEntry { id, listener };
        self.inner.listeners.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(entry.clone());
            next
        });
        tracing::debug!(listener = %id, "listener registered");
        id
    }

    /// Register a closure and return a handle that unsubscribes it on drop.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConfigurationEvent) + Send + Sync + 'static,
    {
        let id = self.add_listener(Arc::new(callback));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Remove the first registration of `listener`.
    ///
    /// Listeners are matched by `Arc` identity. Returns `false` if the listener
    /// was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn ConfigurationListener>) -> bool {
        let previous = self.inner.listeners.rcu(|current| {
            let mut next = Vec::clone(current);
            if let Some(pos) = next
                .iter()
                .position(|entry| Arc::ptr_eq(&entry.listener, listener))
            {
                next.remove(pos);
            }
            next
        });
        let removed = previous
            .iter()
            .any(|entry| Arc::ptr_eq(&entry.listener, listener));
        if removed {
            tracing::debug!("listener removed");
        }
        removed
    }

    /// Remove the registration with the given id.
    ///
    /// Returns `false` if no such registration exists.
    pub fn remove(&self, id: ListenerId) -> bool {
        let removed = self.inner.remove_id(id);
        if removed {
            tracing::debug!(listener = %id, "listener removed");
        }
        removed
    }

    /// Remove all registrations.
    pub fn clear(&self) {
        self.inner.listeners.store(Arc::new(Vec::new()));
    }

    /// Snapshot of the currently registered listeners, in delivery order.
    pub fn listeners(&self) -> Vec<Arc<dyn ConfigurationListener>> {
        self.inner
            .listeners
            .load()
            .iter()
            .map(|entry| Arc::clone(&entry.listener))
            .collect()
    }

    /// Number of active registrations.
    pub fn len(&self) -> usize {
        self.inner.listeners.load().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver an event to every registered listener, in registration order.
    ///
    /// The listener list is snapshotted before delivery starts; listeners added
    /// or removed while delivering take effect from the next call.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ListenerFailed`] for the first listener that
    /// fails. Listeners after it do not receive the event.
    pub(crate) fn fire(&self, event: &ConfigurationEvent) -> Result<()> {
        let snapshot = self.inner.listeners.load_full();
        for entry in snapshot.iter() {
            tracing::trace!(listener = %entry.id, %event, "delivering event");
            entry.listener.configuration_changed(event).map_err(|source| {
                tracing::warn!(listener = %entry.id, %event, error = %source, "listener failed");
                ConfigError::ListenerFailed {
                    listener: entry.id,
                    event_type: event.event_type(),
                    before: event.is_before_update(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventType, ListenerError};
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn clear_event() -> ConfigurationEvent {
        ConfigurationEvent::new(EventType::Clear, None, None, true)
    }

    struct Failing;

    impl ConfigurationListener for Failing {
        fn configuration_changed(
            &self,
            _event: &ConfigurationEvent,
        ) -> std::result::Result<(), ListenerError> {
            Err(ListenerError::new("boom"))
        }
    }

    #[test]
    fn test_add_and_fire() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        registry.add_listener(Arc::new(move |_: &ConfigurationEvent| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        }));

        registry.fire(&clear_event()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        registry.fire(&clear_event()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_registration_order() {
        let registry = ListenerRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for n in 0..3 {
            let order = Arc::clone(&order);
            registry.add_listener(Arc::new(move |_: &ConfigurationEvent| {
                order.lock().push(n);
            }));
        }

        registry.fire(&clear_event()).unwrap();
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let listener: Arc<dyn ConfigurationListener> =
            Arc::new(move |_: &ConfigurationEvent| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            });

        let first = registry.add_listener(Arc::clone(&listener));
        let second = registry.add_listener(Arc::clone(&listener));
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);

        registry.fire(&clear_event()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        // Only the first registration goes away
        assert!(registry.remove_listener(&listener));
        assert_eq!(registry.len(), 1);
        registry.fire(&clear_event()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_remove_unknown_listener() {
        let registry = ListenerRegistry::new();
        let listener: Arc<dyn ConfigurationListener> = Arc::new(|_: &ConfigurationEvent| {});

        assert!(!registry.remove_listener(&listener));
        assert!(!registry.remove(ListenerId::from_raw(42)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_by_id() {
        let registry = ListenerRegistry::new();
        let id = registry.add_listener(Arc::new(|_: &ConfigurationEvent| {}));

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_subscription_drop_unsubscribes() {
        let registry = ListenerRegistry::new();
        assert_eq!(registry.len(), 0);

        let handle1 = registry.subscribe(|_| {});
        assert_eq!(registry.len(), 1);

        let _handle2 = registry.subscribe(|_| {});
        assert_eq!(registry.len(), 2);

        drop(handle1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_subscription_outlives_registry() {
        let registry = ListenerRegistry::new();
        let handle = registry.subscribe(|_| {});
        drop(registry);
        drop(handle);
    }

    #[test]
    fn test_failure_stops_delivery() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let failing_id = registry.add_listener(Arc::new(Failing));
        let counter_clone = Arc::clone(&counter);
        registry.add_listener(Arc::new(move |_: &ConfigurationEvent| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let err = registry.fire(&clear_event()).unwrap_err();
        match err {
            ConfigError::ListenerFailed {
                listener,
                event_type,
                before,
                source,
            } => {
                assert_eq!(listener, failing_id);
                assert_eq!(event_type, EventType::Clear);
                assert!(before);
                assert_eq!(source.message(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_removal_during_fire_uses_snapshot() {
        let registry = Arc::new(ListenerRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let second_id = Arc::new(Mutex::new(None::<ListenerId>));
        let registry_clone = Arc::clone(&registry);
        let second_id_clone = Arc::clone(&second_id);
        registry.add_listener(Arc::new(move |_: &ConfigurationEvent| {
            if let Some(id) = *second_id_clone.lock() {
                registry_clone.remove(id);
            }
        }));

        let counter_clone = Arc::clone(&counter);
        let id = registry.add_listener(Arc::new(move |_: &ConfigurationEvent| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        }));
        *second_id.lock() = Some(id);

        // Removed by the first listener, but still part of this fan-out
        registry.fire(&clear_event()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);

        registry.fire(&clear_event()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_addition_during_fire_applies_next_time() {
        let registry = Arc::new(ListenerRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let added = Arc::new(AtomicUsize::new(0));

        let registry_clone = Arc::clone(&registry);
        let counter_clone = Arc::clone(&counter);
        let added_clone = Arc::clone(&added);
        registry.add_listener(Arc::new(move |_: &ConfigurationEvent| {
            if added_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                let counter = Arc::clone(&counter_clone);
                registry_clone.add_listener(Arc::new(move |_: &ConfigurationEvent| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }));

        registry.fire(&clear_event()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        registry.fire(&clear_event()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_and_snapshot() {
        let registry = ListenerRegistry::new();
        registry.add_listener(Arc::new(|_: &ConfigurationEvent| {}));
        registry.add_listener(Arc::new(|_: &ConfigurationEvent| {}));
        assert_eq!(registry.listeners().len(), 2);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.listeners().is_empty());
    }
}
