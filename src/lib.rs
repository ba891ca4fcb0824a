//! # servicevisor
//!
//! **Servicevisor** launches a selected subset of platform components inside
//! one process and supervises them as a unit: the first component to stop
//! (cleanly or not) stops the whole process.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   operator request (--components runservice,gateway | all)
//!            │
//!            ▼
//!   ┌─────────────────┐    ┌──────────────────┐
//!   │ Registry        │    │ Config bundle    │
//!   │ (known names +  │    │ (TOML, one file) │
//!   │  wildcard)      │    └────────┬─────────┘
//!   └────────┬────────┘             │
//!            ▼                      │
//!   Selection::resolve ─► Err: NoComponents / UnknownComponent
//!            │                      │
//!            ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - Catalog (ordered constructor table)                            │
//! │  - EmbeddedCoordinator (optional, started first, closed last)     │
//! │  - root CancellationToken (shared by every component)             │
//! │  - Bus + SubscriberSet (lifecycle events)                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//!   │ coordinator │   │ component 1 │   │ component N │
//!   └──────┬──────┘   └──────┬──────┘   └──────┬──────┘
//!          └─────────────────┴────── Outcome ──┴──► first outcome wins
//!                                                   ├─► cancel root token
//!                                                   ├─► wait grace, abort rest
//!                                                   └─► Ok / ServeError::Run
//! ```
//!
//! ### Events
//! ```text
//! Supervisor / runners ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                          │
//!                                                   SubscriberSet::emit
//!                                               ┌──────────┼──────────┐
//!                                               ▼          ▼          ▼
//!                                           LogWriter   worker2    workerN
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                        |
//! |-------------------|----------------------------------------------------------|-------------------------------------------|
//! | **Components**    | Long-running services driven by a root token.            | [`Component`], [`ComponentFn`]            |
//! | **Selection**     | Validated operator request against known names.          | [`Registry`], [`Selection`]               |
//! | **Construction**  | Ordered, fail-fast constructor table.                    | [`Catalog`], [`BuildContext`]             |
//! | **Supervision**   | Co-run until the first outcome, then graceful stop.      | [`Supervisor`], [`ServeOptions`]          |
//! | **Coordination**  | Embedded key-value/lock backend for single-node setups.  | [`EmbeddedCoordinator`], [`Store`]        |
//! | **Subscriber API**| Hook into lifecycle events.                              | [`Subscribe`], [`LogWriter`]              |
//! | **Errors**        | Typed errors for serving and component execution.       | [`ServeError`], [`ComponentError`]        |
//! | **Configuration** | Service bundle and runtime settings.                     | [`Config`], [`SupervisorConfig`]          |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use servicevisor::{
//!     BuildContext, Catalog, ComponentFn, Config, LogWriter, Selection, Subscribe, Supervisor,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::new()
//!         .with("worker", |_ctx: &BuildContext<'_>| {
//!             Ok(ComponentFn::boxed("worker", |ctx: CancellationToken| async move {
//!                 ctx.cancelled().await;
//!                 Ok(())
//!             }))
//!         })
//!         .with("oneshot", |_ctx: &BuildContext<'_>| {
//!             Ok(ComponentFn::boxed("oneshot", |_ctx: CancellationToken| async { Ok(()) }))
//!         });
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let sup = Supervisor::builder(catalog).with_subscribers(subs).build();
//!
//!     // "oneshot" returns right away, which stops "worker" too.
//!     let sel = Selection::resolve(sup.registry(), ["all"])?;
//!     sup.launch(&sel, &Config::default(), None).await?;
//!     Ok(())
//! }
//! ```
mod components;
mod config;
mod coordinator;
mod core;
mod error;
mod events;
mod services;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    ServeOptions, Supervisor, SupervisorBuilder, SupervisorConfig, wait_for_shutdown_signal,
};
pub use components::{
    BuildContext, Catalog, Component, ComponentFn, ComponentHandle, Constructor, Registry,
    Selection, WILDCARD,
};
pub use config::{
    Config, ConfigError, ConfigstoreConfig, DEFAULT_GATEWAY_URL, ExecutorConfig, GatewayConfig,
    GitserverConfig, NotificationConfig, RunserviceConfig, SchedulerConfig, WebConfig,
};
pub use coordinator::{
    COORDINATOR_NAME, CoordinatorComponent, CoordinatorError, EmbeddedCoordinator, KeyValue,
    LOCK_PREFIX, Store,
};
pub use error::{ComponentError, ServeError};
pub use events::{Bus, Event, EventKind};
pub use services::{
    CONFIGSTORE, EXECUTOR, GATEWAY, GITSERVER, ListenerService, NOTIFICATION, RUNSERVICE,
    SCHEDULER, TickerService, platform_catalog,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
