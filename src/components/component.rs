//! # Component abstraction.
//!
//! A [`Component`] is one long-running service (scheduler, gateway, ...).
//! It has a stable [`name`](Component::name) and an async [`run`](Component::run)
//! method that receives the supervisor's root [`CancellationToken`].
//!
//! Under normal operation `run` never returns: it is itself a server loop.
//! Any return, clean or not, is a terminal outcome for the whole process.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ComponentError;

/// # Runnable component.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use servicevisor::{Component, ComponentError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Component for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), ComponentError> {
///         ctx.cancelled().await;
///         Err(ComponentError::Canceled)
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Returns a stable, human-readable component name.
    fn name(&self) -> &str;

    /// Runs the component until it fails or `ctx` is cancelled.
    ///
    /// Implementations should return `Err(ComponentError::Canceled)` (or `Ok`)
    /// promptly once `ctx` is cancelled.
    async fn run(&self, ctx: CancellationToken) -> Result<(), ComponentError>;
}

/// Constructed, not-yet-started component, owned by the supervisor.
pub type ComponentHandle = Box<dyn Component>;
