//! Built-in metrics for configuration events.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Events delivered, by type and phase
//! - Completed mutations
//! - Time since the last completed mutation
//! - Active listeners
//!
//! # Examples
//!
//! ```rust,no_run
//! use configuration_events::metrics::EventMetrics;
//! use configuration_events::prelude::*;
//! use opentelemetry::global;
//! use std::sync::Arc;
//!
//! let config = Configuration::new();
//! let metrics = Arc::new(EventMetrics::new(global::meter("my-app")));
//! config.add_listener(metrics.clone());
//! metrics.update_listener_count(config.listener_count());
//! ```

mod event_metrics;

pub use event_metrics::EventMetrics;
