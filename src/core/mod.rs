//! Runtime core: construction, supervision and shutdown.
//!
//! The public API from this module is [`Supervisor`] (with its builder and
//! [`SupervisorConfig`]) and [`wait_for_shutdown_signal`].
//!
//! Internal modules:
//! - [`runner`]: one execution path per component, reports its outcome;
//! - [`supervisor`]: validation, sequential construction, first-outcome wait;
//! - [`builder`]: wires bus, subscribers and the root token;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod runner;
mod shutdown;
mod supervisor;

use std::any::Any;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::{ServeOptions, Supervisor};

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
