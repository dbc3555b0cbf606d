//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Operational counters
//! - Typed server events
//!
//! Observability is read-only: it never changes what the server does, and
//! a failure to write a log line is ignored.
//!
//! # Usage
//!
//! ```ignore
//! use teachmachine::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::ModelTrained, &[("size", "12")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_retrains();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a server event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a server event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

fn severity_of(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    }
}
