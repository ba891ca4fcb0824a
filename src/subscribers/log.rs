//! # LogWriter: events rendered through `tracing`
//!
//! A subscriber that turns every [`Event`] into one structured log record.
//! Failures log at `error`, grace/overflow problems at `warn`, the rest at
//! `info` (lifecycle) or `debug` (construction).
//!
//! ## Example output
//! ```text
//! INFO component constructed component=gateway
//! INFO component starting component=gateway
//! ERROR component failed component=gateway reason=port in use
//! INFO shutdown requested component=gateway
//! INFO all components stopped within grace
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let component = e.component.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::CoordinatorStarting => {
                info!(data_dir = reason, "starting embedded coordinator");
            }
            EventKind::ComponentConstructed => {
                debug!(component, "component constructed");
            }
            EventKind::ConstructionFailed => {
                error!(component, reason, "component construction failed");
            }
            EventKind::ComponentStarting => {
                info!(component, "component starting");
            }
            EventKind::ComponentStopped => {
                info!(component, "component stopped");
            }
            EventKind::ComponentFailed => {
                error!(component, reason, "component failed");
            }
            EventKind::ShutdownRequested => {
                info!(component, "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                info!("all components stopped within grace");
            }
            EventKind::GraceExceeded => {
                warn!(still_running = reason, "grace exceeded, aborting components");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = component, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(subscriber = component, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
