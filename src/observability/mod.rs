//! Observability for paystore
//!
//! - Structured logging (one JSON line per event)
//! - Per-store counters
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on store operations
//! 3. No background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use paystore::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::PaymentCreated, &[("id", "...")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_created();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
