use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{config::SupervisorConfig, supervisor::Supervisor};
use crate::{
    components::Catalog,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    catalog: Catalog,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with default configuration and no subscribers.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            cfg: SupervisorConfig::default(),
            catalog,
            subscribers: Vec::new(),
        }
    }

    /// Sets the runtime configuration.
    pub fn with_config(mut self, cfg: SupervisorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (construction, lifecycle, shutdown)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor and starts forwarding bus events to subscribers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Supervisor {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        let runtime_token = CancellationToken::new();
        let listener_stop = CancellationToken::new();

        let listener = (!subs.is_empty())
            .then(|| subscriber_listener(&bus, Arc::clone(&subs), listener_stop.clone()));
        Supervisor::new_internal(
            self.cfg,
            bus,
            subs,
            self.catalog,
            runtime_token,
            Listener {
                handle: listener,
                stop: listener_stop,
            },
        )
    }
}

/// Bus-to-subscriber forwarding task and its stop signal.
pub(crate) struct Listener {
    pub(crate) handle: Option<JoinHandle<()>>,
    pub(crate) stop: CancellationToken,
}

/// Forwards bus events to the subscriber set.
///
/// Once `stop` fires, events already on the bus are still forwarded before the
/// task exits.
fn subscriber_listener(
    bus: &Bus,
    set: Arc<SubscriberSet>,
    stop: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => return,
                },
                _ = stop.cancelled() => break,
            }
        }
        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit(&ev),
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    })
}
