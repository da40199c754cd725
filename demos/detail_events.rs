//! Example showing coarse and detail events side by side.
//!
//! Run with:
//! ```bash
//! RUST_LOG=configuration_events=debug cargo run --example detail_events
//! ```

use config::Value;
use configuration_events::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Configuration Events Demo ===\n");

    let config = Configuration::new();
    config.add_property("event.property", "existing value")?;
    config.add_property("db.hosts", vec![Value::from("primary"), Value::from("replica")])?;

    // Indent nested events by their depth
    let depth = Arc::new(AtomicUsize::new(0));
    let depth_clone = Arc::clone(&depth);
    let _printer = config.subscribe(move |event: &ConfigurationEvent| {
        let level = if event.is_before_update() {
            depth_clone.fetch_add(1, Ordering::SeqCst)
        } else {
            depth_clone.fetch_sub(1, Ordering::SeqCst) - 1
        };
        println!("{}{}", "  ".repeat(level), event);
    });

    println!("--- Detail events off ---");
    config.set_property("event.property", "a value")?;
    config.clear()?;

    config.add_property("event.property", "existing value")?;
    config.add_property("db.hosts", vec![Value::from("primary"), Value::from("replica")])?;

    println!("\n--- Detail events on ---");
    config.set_detail_events(true);
    config.set_property("event.property", "a value")?;
    config.clear()?;

    println!("\n--- Protected property ---");
    config.add_property("app.name", "demo")?;
    config.protect("app.name");
    match config.set_property("app.name", "other") {
        Err(e) => println!("Rejected without events: {}", e),
        Ok(()) => println!("Unexpectedly accepted"),
    }

    Ok(())
}
