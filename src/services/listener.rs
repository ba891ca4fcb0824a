//! # Network-facing service shell.
//!
//! [`ListenerService`] binds its configured address when it starts running and
//! accepts connections until the root token is cancelled. Accepted
//! connections are closed right away; real protocol handling plugs in through
//! a dedicated [`Component`].
//!
//! Only a bind failure ends the service. Accept errors (aborted handshakes,
//! descriptor exhaustion) are logged and accepting resumes after a short pause.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::components::Component;
use crate::config::WebConfig;
use crate::error::ComponentError;

const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Component that owns one listening socket.
pub struct ListenerService {
    name: String,
    addr: SocketAddr,
    bound: std::sync::Mutex<Option<oneshot::Sender<SocketAddr>>>,
}

impl ListenerService {
    /// Validates `web.listen_address` and prepares the service.
    pub fn new(name: impl Into<String>, web: &WebConfig) -> Result<Self, ComponentError> {
        let name = name.into();
        let addr = web.listen_address.parse::<SocketAddr>().map_err(|e| {
            ComponentError::config(format!(
                "{name}: invalid listen_address {:?}: {e}",
                web.listen_address
            ))
        })?;
        Ok(Self {
            name,
            addr,
            bound: std::sync::Mutex::new(None),
        })
    }

    /// Configured address (port may be 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns a receiver resolving to the actual bound address once `run` binds.
    pub fn bound_addr(&self) -> oneshot::Receiver<SocketAddr> {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut slot) = self.bound.lock() {
            *slot = Some(tx);
        }
        rx
    }

    async fn on_accepted(&self, accepted: io::Result<(TcpStream, SocketAddr)>) {
        match accepted {
            Ok((stream, peer)) => {
                debug!(component = %self.name, %peer, "connection accepted");
                drop(stream);
            }
            Err(e) => {
                warn!(component = %self.name, error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
            }
        }
    }

    fn notify_bound(&self, addr: SocketAddr) {
        let sender = self.bound.lock().ok().and_then(|mut slot| slot.take());
        if let Some(tx) = sender {
            let _ = tx.send(addr);
        }
    }
}

#[async_trait]
impl Component for ListenerService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), ComponentError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ComponentError::io(format!("failed to bind {}", self.addr), e))?;
        let local = listener
            .local_addr()
            .map_err(|e| ComponentError::io("failed to read local address", e))?;
        info!(component = %self.name, addr = %local, "listening");
        self.notify_bound(local);

        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Err(ComponentError::Canceled),
                accepted = listener.accept() => self.on_accepted(accepted).await,
            }
        }
    }
}
