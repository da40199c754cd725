//! Shared test helpers.

#![allow(dead_code)]

use config::Value;
use configuration_events::prelude::*;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Property name used for properties added by a test.
pub const TEST_PROPNAME: &str = "event.test";

/// Value used for properties added or set by a test.
pub const TEST_PROPVALUE: &str = "a value";

/// Property present in every fixture configuration.
pub const EXIST_PROPERTY: &str = "event.property";

/// Listener that records received events for later verification.
///
/// Checks consume events from the front of the recorded sequence.
#[derive(Default)]
pub struct EventRecorder {
    events: Mutex<VecDeque<ConfigurationEvent>>,
}

impl EventRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All events received so far, without consuming them.
    pub fn events(&self) -> Vec<ConfigurationEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of events not yet consumed.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Consume the next event and check its content.
    pub fn check_event(
        &self,
        event_type: EventType,
        name: Option<&str>,
        value: Option<&str>,
        before: bool,
    ) {
        let event = self
            .events
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("expected {event_type} event, but none was received"));

        assert_eq!(event.event_type(), event_type, "wrong event type in {event}");
        assert_eq!(event.property_name(), name, "wrong property name in {event}");
        assert_eq!(
            event.property_value().cloned(),
            value.map(Value::from),
            "wrong property value in {event}"
        );
        assert_eq!(event.is_before_update(), before, "wrong phase in {event}");
    }

    /// Check that at least `min` events were received.
    pub fn check_event_count(&self, min: usize) {
        let count = self.len();
        assert!(count >= min, "expected at least {min} events, got {count}");
    }

    /// Skip the detail events up to the last recorded event.
    ///
    /// None of the skipped events may be the closing event of the enclosing
    /// operation, i.e. an after-event of `event_type` for the same property.
    pub fn skip_to_last(&self, event_type: EventType) {
        let mut events = self.events.lock();
        let Some(last) = events.back().cloned() else {
            panic!("no events to skip");
        };
        while events.len() > 1 {
            let detail = events.pop_front().unwrap();
            assert!(
                !(detail.event_type() == event_type
                    && !detail.is_before_update()
                    && detail.property_name() == last.property_name()
                    && detail.property_value() == last.property_value()),
                "found closing {event_type} event among detail events: {detail}"
            );
        }
    }

    /// Check that all received events were consumed.
    pub fn done(&self) {
        let events = self.events.lock();
        assert!(events.is_empty(), "unexpected events left: {:?}", events);
    }

    /// Forget everything received so far.
    pub fn reset(&self) {
        self.events.lock().clear();
    }
}

impl ConfigurationListener for EventRecorder {
    fn configuration_changed(
        &self,
        event: &ConfigurationEvent,
    ) -> std::result::Result<(), ListenerError> {
        self.events.lock().push_back(event.clone());
        Ok(())
    }
}

/// A configuration holding [`EXIST_PROPERTY`], with a recorder registered after
/// the fixture property was added.
pub fn fixture() -> (Configuration, Arc<EventRecorder>) {
    let config = Configuration::new();
    config
        .add_property(EXIST_PROPERTY, "existing value")
        .expect("fixture property");
    let recorder = EventRecorder::new();
    config.add_listener(recorder.clone());
    (config, recorder)
}

/// Check that `events` form one well-nested sequence of before/after pairs
/// starting with the opening event of `event_type` and ending with its
/// closing event.
pub fn assert_well_nested(events: &[ConfigurationEvent], event_type: EventType) {
    assert!(events.len() >= 2, "expected at least a pair, got {events:?}");
    assert_eq!(events[0].event_type(), event_type);
    assert!(events[0].is_before_update());

    let mut open: Vec<&ConfigurationEvent> = Vec::new();
    for (i, event) in events.iter().enumerate() {
        if event.is_before_update() {
            open.push(event);
        } else {
            let opening = open
                .pop()
                .unwrap_or_else(|| panic!("after-event without before-event: {event}"));
            assert_eq!(opening.event_type(), event.event_type());
            assert_eq!(opening.property_name(), event.property_name());
            assert_eq!(opening.property_value(), event.property_value());
            if open.is_empty() {
                assert_eq!(i, events.len() - 1, "events after the closing event: {events:?}");
            }
        }
    }
    assert!(open.is_empty(), "unclosed before-events: {open:?}");
}
