//! Event metrics tracking using OpenTelemetry.

use crate::event::{ConfigurationEvent, ConfigurationListener, ListenerError};
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Gauge, Meter};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector for configuration events.
///
/// `EventMetrics` is itself a listener: register it on a configuration and it
/// counts every event delivered to it. It never fails delivery.
///
/// # Examples
///
/// ```rust,no_run
/// use configuration_events::metrics::EventMetrics;
/// use opentelemetry::global;
///
/// let meter = global::meter("configuration-events");
/// let metrics = EventMetrics::new(meter);
/// metrics.update_config_age();
/// ```
#[derive(Clone)]
pub struct EventMetrics {
    events_fired: Counter<u64>,
    mutations: Counter<u64>,
    config_age_seconds: Gauge<i64>,
    active_listeners: Gauge<i64>,
    last_update: Arc<parking_lot::Mutex<Instant>>,
}

impl EventMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let events_fired = meter
            .u64_counter("configuration_events.events.fired")
            .with_description("Number of events delivered, by type and phase")
            .build();

        let mutations = meter
            .u64_counter("configuration_events.mutations")
            .with_description("Number of completed mutations (after-events), by type")
            .build();

        let config_age_seconds = meter
            .i64_gauge("configuration_events.age")
            .with_description("Time since the last completed mutation in seconds")
            .with_unit("s")
            .build();

        let active_listeners = meter
            .i64_gauge("configuration_events.listeners.active")
            .with_description("Number of active listeners")
            .build();

        Self {
            events_fired,
            mutations,
            config_age_seconds,
            active_listeners,
            last_update: Arc::new(parking_lot::Mutex::new(Instant::now())),
        }
    }

    /// Record one delivered event.
    pub fn record_event(&self, event: &ConfigurationEvent) {
        let phase = if event.is_before_update() { "before" } else { "after" };
        let event_type = event.event_type().as_str();
        self.events_fired.add(
            1,
            &[
                KeyValue::new("event_type", event_type),
                KeyValue::new("phase", phase),
            ],
        );

        if !event.is_before_update() {
            self.mutations.add(1, &[KeyValue::new("event_type", event_type)]);
            *self.last_update.lock() = Instant::now();
        }
    }

    /// Update the number of active listeners.
    pub fn update_listener_count(&self, count: usize) {
        self.active_listeners.record(count as i64, &[]);
    }

    /// Update the configuration age metric.
    ///
    /// This should be called periodically to track how long ago the
    /// configuration last changed.
    pub fn update_config_age(&self) {
        let age_secs = self.last_update.lock().elapsed().as_secs() as i64;
        self.config_age_seconds.record(age_secs, &[]);
    }
}

impl ConfigurationListener for EventMetrics {
    fn configuration_changed(&self, event: &ConfigurationEvent) -> Result<(), ListenerError> {
        self.record_event(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Configuration;
    use opentelemetry::global;

    #[test]
    fn test_metrics_creation() {
        let meter = global::meter("test");
        let metrics = EventMetrics::new(meter);

        // Test basic operations don't panic
        metrics.update_listener_count(5);
        metrics.update_config_age();
    }

    #[test]
    fn test_metrics_as_listener() {
        let config = Configuration::new();
        let metrics = Arc::new(EventMetrics::new(global::meter("test")));
        config.add_listener(metrics.clone());
        config.set_detail_events(true);

        config.add_property("a", 1_i64).unwrap();
        config.set_property("a", 2_i64).unwrap();
        config.clear().unwrap();

        metrics.update_listener_count(config.listener_count());
        metrics.update_config_age();
    }
}
