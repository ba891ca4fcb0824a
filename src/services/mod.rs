//! Built-in component shells and the platform catalog.
//!
//! - [`ListenerService`] binds a TCP address and accepts until cancelled.
//! - [`TickerService`] wakes up at a fixed interval until cancelled.
//! - [`platform_catalog`] maps the seven platform names onto these shells.

mod listener;
mod platform;
mod ticker;

pub use listener::ListenerService;
pub use platform::{
    CONFIGSTORE, EXECUTOR, GATEWAY, GITSERVER, NOTIFICATION, RUNSERVICE, SCHEDULER,
    platform_catalog,
};
pub use ticker::TickerService;
