//! # Runtime events emitted by the supervisor and component runners.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Startup events**: coordinator bootstrap and component construction
//! - **Lifecycle events**: component execution (starting, stopped, failed)
//! - **Shutdown events**: first outcome observed, grace accounting
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! component name and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use servicevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ComponentFailed)
//!     .with_component("gateway")
//!     .with_reason("port in use");
//!
//! assert_eq!(ev.kind, EventKind::ComponentFailed);
//! assert_eq!(ev.component.as_deref(), Some("gateway"));
//! assert_eq!(ev.reason.as_deref(), Some("port in use"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `component`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `component`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Startup events ===
    /// The embedded coordination backend is starting.
    ///
    /// Sets:
    /// - `reason`: data directory
    CoordinatorStarting,

    /// A component constructor succeeded.
    ///
    /// Sets:
    /// - `component`: component name
    ComponentConstructed,

    /// A component constructor failed; construction is aborted.
    ///
    /// Sets:
    /// - `component`: component name
    /// - `reason`: constructor error
    ConstructionFailed,

    // === Lifecycle events ===
    /// A component's execution path is starting.
    ///
    /// Sets:
    /// - `component`: component name
    ComponentStarting,

    /// A component returned cleanly or stopped on cancellation.
    ///
    /// Sets:
    /// - `component`: component name
    ComponentStopped,

    /// A component returned an error (or panicked).
    ///
    /// Sets:
    /// - `component`: component name
    /// - `reason`: error message
    ComponentFailed,

    // === Shutdown events ===
    /// First outcome consumed; the root token is being cancelled.
    ///
    /// Sets:
    /// - `component`: component whose outcome arrived first
    ShutdownRequested,

    /// Every remaining execution path stopped within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; remaining paths are aborted.
    ///
    /// Sets:
    /// - `reason`: number of paths still running
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the component (or subscriber), if applicable.
    pub component: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            component: None,
            reason: None,
        }
    }

    /// Attaches a component name.
    #[inline]
    pub fn with_component(mut self, component: impl Into<Arc<str>>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_component(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_component(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::ComponentStarting);
        let b = Event::new(EventKind::ComponentStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn overflow_event_carries_subscriber() {
        let ev = Event::subscriber_overflow("log", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.component.as_deref(), Some("log"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=log reason=full"));
    }
}
