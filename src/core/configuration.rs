//! The configuration store that fires events around its mutations.

use crate::core::PropertyValidator;
use crate::core::store::{PropertyStore, split_values};
use crate::error::{ConfigError, Result};
use crate::event::{
    ConfigurationEvent, ConfigurationListener, EventType, ListenerId, ListenerRegistry,
    Subscription,
};
use crate::sources::{ConfigSource, flatten_properties};
use config::Value;
use parking_lot::{ReentrantMutex, RwLock};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A mutable, hierarchical configuration store that notifies listeners.
///
/// Every mutating call (`add_property`, `set_property`, `clear_property`,
/// `clear`) runs the same protocol:
///
/// 1. Pre-check: key and value are validated. Failure returns an error and
///    fires nothing.
/// 2. A before-event is fired.
/// 3. The mutation executes. With detail events enabled, composite operations
///    fire nested before/after pairs for their sub-operations here.
/// 4. An after-event with the same type, name and value is fired.
/// 5. The call returns.
///
/// The whole window is serialized per instance, so listeners never see pairs
/// from concurrent callers interleave. The lock is reentrant: a listener may
/// call back into the same configuration from the delivering thread.
///
/// If a listener fails, delivery stops and the error is returned; the remaining
/// phases of the call are skipped. A failing before-event listener therefore
/// leaves the store untouched.
///
/// # Examples
///
/// ```rust
/// use configuration_events::prelude::*;
///
/// # fn example() -> Result<()> {
/// let config = Configuration::new();
///
/// let _subscription = config.subscribe(|event: &ConfigurationEvent| {
///     println!("{event}");
/// });
///
/// config.add_property("event.test", "a value")?;
/// assert_eq!(config.get_string("event.test").as_deref(), Some("a value"));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct Configuration {
    /// Property data; never held while listeners run
    store: RwLock<PropertyStore>,
    /// Keys that may not be mutated
    protected: RwLock<BTreeSet<String>>,
    /// Listeners owned by this instance
    listeners: ListenerRegistry,
    /// Whether composite operations fire nested sub-operation events
    detail_events: AtomicBool,
    /// Optional validator applied during the pre-check
    validator: Option<Arc<dyn PropertyValidator>>,
    /// Serializes the before/execute/after window
    operation_lock: ReentrantMutex<()>,
}

impl Configuration {
    /// Create an empty configuration with no listeners and detail events off.
    pub fn new() -> Self {
        Self::with_parts(PropertyStore::new(), None)
    }

    pub(crate) fn with_parts(
        store: PropertyStore,
        validator: Option<Arc<dyn PropertyValidator>>,
    ) -> Self {
        Self {
            store: RwLock::new(store),
            protected: RwLock::new(BTreeSet::new()),
            listeners: ListenerRegistry::new(),
            detail_events: AtomicBool::new(false),
            validator,
            operation_lock: ReentrantMutex::new(()),
        }
    }

    /// Register a listener for all events fired by this configuration.
    ///
    /// Registering the same listener twice gives two registrations.
    pub fn add_listener(&self, listener: Arc<dyn ConfigurationListener>) -> ListenerId {
        self.listeners.add_listener(listener)
    }

    /// Remove the first registration of `listener`.
    ///
    /// Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn ConfigurationListener>) -> bool {
        self.listeners.remove_listener(listener)
    }

    /// Remove a registration by id.
    pub fn remove_listener_by_id(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Register a closure; dropping the returned handle unregisters it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConfigurationEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// Remove every registered listener.
    pub fn clear_listeners(&self) {
        self.listeners.clear();
    }

    /// Number of active listener registrations.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// The listener registry of this configuration.
    pub fn listener_registry(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Enable or disable detail events.
    ///
    /// Takes effect for mutating calls started after this returns. A call
    /// already in progress keeps the setting it started with, even if a
    /// listener toggles the flag while handling its before-event.
    pub fn set_detail_events(&self, enabled: bool) {
        self.detail_events.store(enabled, Ordering::SeqCst);
        tracing::debug!(enabled, "detail events toggled");
    }

    /// Whether detail events are enabled.
    pub fn is_detail_events(&self) -> bool {
        self.detail_events.load(Ordering::SeqCst)
    }

    /// Add a value to a property.
    ///
    /// If the property already exists the value is appended. A list value is
    /// added element by element; with detail events enabled each element gets
    /// its own nested `AddProperty` pair.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidOperation`] for an empty or protected key
    /// - [`ConfigError::ValidationError`] if the validator rejects the value
    /// - [`ConfigError::ListenerFailed`] if a listener fails
    pub fn add_property(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let _guard = self.operation_lock.lock();
        self.check_key(key)?;
        self.check_value(key, &value)?;
        let detail = self.is_detail_events();

        let event =
            ConfigurationEvent::new(EventType::AddProperty, Some(key), Some(value.clone()), true);
        self.notify_around(event, || self.add_values(key, &value, detail))
    }

    /// Overwrite a property with a new value.
    ///
    /// With detail events enabled the replacement is announced as a nested
    /// `ClearProperty` pair followed by a nested `AddProperty` pair.
    ///
    /// # Errors
    ///
    /// Same as [`add_property`](Self::add_property).
    pub fn set_property(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let _guard = self.operation_lock.lock();
        self.check_key(key)?;
        self.check_value(key, &value)?;
        self.set_checked(key, value)
    }

    /// Remove a property.
    ///
    /// Clearing a key that does not exist is not an error; the event pair is
    /// still fired.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidOperation`] for an empty or protected key
    /// - [`ConfigError::ListenerFailed`] if a listener fails
    pub fn clear_property(&self, key: &str) -> Result<()> {
        let _guard = self.operation_lock.lock();
        self.check_key(key)?;

        let event = ConfigurationEvent::new(EventType::ClearProperty, Some(key), None, true);
        self.notify_around(event, || {
            self.remove_key(key);
            Ok(())
        })
    }

    /// Remove all properties.
    ///
    /// With detail events enabled each stored key is cleared through a nested
    /// `ClearProperty` pair, in key order.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidOperation`] if a protected key is stored
    /// - [`ConfigError::ListenerFailed`] if a listener fails
    pub fn clear(&self) -> Result<()> {
        let _guard = self.operation_lock.lock();
        {
            let store = self.store.read();
            let protected = self.protected.read();
            if let Some(key) = protected.iter().find(|key| store.contains_key(key)) {
                tracing::warn!(key = %key, "clear rejected: protected property present");
                return Err(ConfigError::InvalidOperation(format!(
                    "cannot clear configuration: property '{}' is protected",
                    key
                )));
            }
        }
        let detail = self.is_detail_events();

        let event = ConfigurationEvent::new(EventType::Clear, None, None, true);
        self.notify_around(event, || {
            if detail {
                let keys = self.store.read().keys();
                for key in keys {
                    let event = ConfigurationEvent::new(
                        EventType::ClearProperty,
                        Some(key.as_str()),
                        None,
                        true,
                    );
                    self.notify_around(event, || {
                        self.remove_key(&key);
                        Ok(())
                    })?;
                }
            }
            // Also drops anything a listener added while the keys were cleared
            self.store.write().clear();
            Ok(())
        })
    }

    /// Load a source into this configuration.
    ///
    /// Nested tables are flattened into dotted keys and each key is written with
    /// [`set_property`](Self::set_property), firing one coarse `SetProperty`
    /// pair per key. Every key and value is pre-checked before the first event
    /// is fired, so a rejected property leaves the store untouched.
    ///
    /// Returns the number of properties written.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded, if any property fails
    /// the pre-check, or if a listener fails.
    pub fn apply_source(&self, source: &dyn ConfigSource) -> Result<usize> {
        let loaded = source.load().map_err(|e| {
            ConfigError::LoadError(format!("Failed to load source '{}': {}", source.name(), e))
        })?;
        let properties = flatten_properties(loaded);

        let _guard = self.operation_lock.lock();
        for (key, value) in &properties {
            self.check_key(key)?;
            self.check_value(key, value)?;
        }

        let count = properties.len();
        for (key, value) in properties {
            self.set_checked(&key, value)?;
        }
        tracing::debug!(source = %source.name(), count, "source applied");
        Ok(count)
    }

    /// Mark a property as immutable.
    ///
    /// Mutations of a protected key, and `clear()` while it is stored, fail
    /// with [`ConfigError::InvalidOperation`] before any event is fired.
    pub fn protect(&self, key: &str) {
        let _guard = self.operation_lock.lock();
        self.protected.write().insert(key.to_owned());
    }

    /// Make a protected property mutable again.
    ///
    /// Returns `false` if the key was not protected.
    pub fn unprotect(&self, key: &str) -> bool {
        let _guard = self.operation_lock.lock();
        self.protected.write().remove(key)
    }

    /// Whether a property is protected.
    pub fn is_protected(&self, key: &str) -> bool {
        self.protected.read().contains(key)
    }

    /// The value of a property; an array value if it holds several.
    pub fn get_property(&self, key: &str) -> Option<Value> {
        self.store.read().get(key)
    }

    /// All values stored for a property, in insertion order.
    pub fn get_list(&self, key: &str) -> Vec<Value> {
        self.store.read().get_all(key)
    }

    /// The property as a string, if present and convertible.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_property(key)?.into_string().ok()
    }

    /// Whether a property is stored.
    pub fn contains_key(&self, key: &str) -> bool {
        self.store.read().contains_key(key)
    }

    /// All property keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.store.read().keys()
    }

    /// Keys equal to `prefix` or nested below it.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.store.read().keys_with_prefix(prefix)
    }

    /// Number of stored properties.
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    /// Whether no properties are stored.
    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Fire `before`, run `execute`, then fire the matching after-event.
    fn notify_around<F>(&self, before: ConfigurationEvent, execute: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        self.listeners.fire(&before)?;
        execute()?;
        self.listeners.fire(&before.to_after())
    }

    fn set_checked(&self, key: &str, value: Value) -> Result<()> {
        let detail = self.is_detail_events();

        let event =
            ConfigurationEvent::new(EventType::SetProperty, Some(key), Some(value.clone()), true);
        self.notify_around(event, || {
            if detail {
                let clear = ConfigurationEvent::new(EventType::ClearProperty, Some(key), None, true);
                self.notify_around(clear, || {
                    self.remove_key(key);
                    Ok(())
                })?;

                let add = ConfigurationEvent::new(
                    EventType::AddProperty,
                    Some(key),
                    Some(value.clone()),
                    true,
                );
                self.notify_around(add, || self.add_values(key, &value, detail))
            } else {
                let mut store = self.store.write();
                store.remove(key);
                for element in split_values(&value) {
                    store.add_value(key, element);
                }
                Ok(())
            }
        })
    }

    fn add_values(&self, key: &str, value: &Value, detail: bool) -> Result<()> {
        let values = split_values(value);
        if detail && values.len() > 1 {
            for element in values {
                let event = ConfigurationEvent::new(
                    EventType::AddProperty,
                    Some(key),
                    Some(element.clone()),
                    true,
                );
                self.notify_around(event, || {
                    self.store.write().add_value(key, element);
                    Ok(())
                })?;
            }
        } else {
            let mut store = self.store.write();
            for element in values {
                store.add_value(key, element);
            }
        }
        Ok(())
    }

    fn remove_key(&self, key: &str) {
        let removed = self.store.write().remove(key);
        tracing::trace!(key, removed, "property cleared");
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            tracing::warn!("operation rejected: empty property key");
            return Err(ConfigError::InvalidOperation(
                "property key must not be empty".to_string(),
            ));
        }
        if self.is_protected(key) {
            tracing::warn!(key, "operation rejected: property is protected");
            return Err(ConfigError::InvalidOperation(format!(
                "property '{}' is protected",
                key
            )));
        }
        Ok(())
    }

    fn check_value(&self, key: &str, value: &Value) -> Result<()> {
        if let Some(validator) = &self.validator {
            for element in split_values(value) {
                validator.validate(key, &element).map_err(|e| {
                    tracing::warn!(key, error = %e, "operation rejected: validation failed");
                    ConfigError::ValidationError(e.to_string())
                })?;
            }
        }
        Ok(())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning copies properties, protected keys and the validator. The clone
/// starts with an empty listener registry and detail events disabled.
impl Clone for Configuration {
    fn clone(&self) -> Self {
        let _guard = self.operation_lock.lock();
        let copy = Self::with_parts(self.store.read().clone(), self.validator.clone());
        *copy.protected.write() = self.protected.read().clone();
        copy
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("properties", &self.len())
            .field("listeners", &self.listener_count())
            .field("detail_events", &self.is_detail_events())
            .finish()
    }
}
