//! Observability subsystem for framedex
//!
//! - Structured logging (JSON lines)
//! - Per-collection counters
//! - Begin/complete scopes around index builds
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on evaluation
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use framedex::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::info("INDEX_BUILD_COMPLETE", &[("rows", "42")]);
//! log_event_with_fields(Event::BackendSelected, &[("backend", "cpu")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{LogLevel, Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    if event.is_failure() {
        Logger::warn(event.as_str(), fields);
    } else {
        Logger::info(event.as_str(), fields);
    }
}

/// Log a per-query event; these are high volume and stay at TRACE
pub fn trace_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::trace(event.as_str(), fields);
}
