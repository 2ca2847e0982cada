//! Observability for upgrade runs
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Run counters
//!
//! Observability is read-only: it never changes the outcome of the
//! operation it observes, and logging failures are ignored.
//!
//! ```ignore
//! use cnxupgrade::observability::{Event, log_event_with_fields, MetricsRegistry};
//!
//! log_event_with_fields(Event::MinorVersionCreated, &[("minor", "2")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_collections_processed();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event_severity(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}
