//! # Supervisor: validates, constructs and co-runs components.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the component
//! [`Catalog`] and the root [`CancellationToken`]. One launch goes through:
//!
//! ```text
//! Validating ──► Constructing ──► Running ──► Terminated(first outcome)
//!
//! serve(opts):
//!   Selection::resolve(registry, opts.components)   (no side effects before this)
//!   Config::load(opts.config)
//!   EmbeddedCoordinator::start(dir)                 (optional, fatal on error)
//!
//! construct (catalog order, fail fast):
//!   for (name, build) in catalog:
//!       skip unless selection.is_enabled(name)
//!       build(&BuildContext) ─► Err ─► close coordinator, return Construct error
//!   nothing built ─► close coordinator, return NoComponents
//!
//! supervise:
//!   outcome channel = mpsc(len)
//!   [coordinator] comp1 comp2 ... compN
//!        │          │     │         │
//!        └──────────┴─────┴─────────┴──► run_component(root) ─► send Outcome
//!
//!   first = outcomes.recv()                         (the only suspension point)
//!   publish ShutdownRequested, root.cancel()
//!   wait_all_with_grace(cfg.grace) ─► AllStoppedWithin | GraceExceeded (abort)
//!   return first.into_result()
//! ```
//!
//! - The first outcome is terminal whether it is a success or a failure.
//! - No retries: a failing component ends the process.
//! - A supervisor serves once; its root token stays cancelled afterwards.
//!
//! ## Example
//! ```rust
//! use servicevisor::{Catalog, BuildContext, ComponentError, ComponentFn, Config, Selection, Supervisor};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let catalog = Catalog::new().with("oneshot", |_ctx: &BuildContext<'_>| {
//!         Ok(ComponentFn::boxed("oneshot", |_t: CancellationToken| async {
//!             Err(ComponentError::failed("port in use"))
//!         }))
//!     });
//!     let sup = Supervisor::builder(catalog).build();
//!
//!     let sel = Selection::resolve(sup.registry(), ["all"]).unwrap();
//!     let err = sup.launch(&sel, &Config::default(), None).await.unwrap_err();
//!     assert_eq!(err.to_string(), "component oneshot exited: port in use");
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::components::{BuildContext, Catalog, ComponentHandle, Registry, Selection};
use crate::config::Config;
use crate::coordinator::{CoordinatorComponent, EmbeddedCoordinator};
use crate::core::builder::{Listener, SupervisorBuilder};
use crate::core::config::SupervisorConfig;
use crate::core::runner::{Outcome, run_component};
use crate::error::ServeError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::SubscriberSet;

/// What to launch: the operator's request.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Path of the configuration bundle.
    pub config: PathBuf,
    /// Requested component names (may contain the wildcard).
    pub components: Vec<String>,
    /// Data directory of the embedded coordinator; `None` = do not start one.
    pub coordinator_dir: Option<PathBuf>,
}

/// Coordinates component construction, execution and the terminal outcome.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    catalog: Catalog,
    registry: Registry,
    runtime_token: CancellationToken,
    listener: Listener,
}

impl Supervisor {
    /// Creates a builder around the given constructor table.
    pub fn builder(catalog: Catalog) -> SupervisorBuilder {
        SupervisorBuilder::new(catalog)
    }

    pub(crate) fn new_internal(
        cfg: SupervisorConfig,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        catalog: Catalog,
        runtime_token: CancellationToken,
        listener: Listener,
    ) -> Self {
        let registry = catalog.registry();
        Self {
            cfg,
            bus,
            subs,
            catalog,
            registry,
            runtime_token,
            listener,
        }
    }

    /// Known component names plus the wildcard.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Root token shared by every component.
    ///
    /// Cancelling it (e.g. on an OS signal) asks every component to stop.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.runtime_token.clone()
    }

    /// Event bus, for publishers outside the runtime.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Validates the selection, loads the configuration and launches.
    ///
    /// Selection errors are reported before the configuration file is read.
    pub async fn serve(&self, opts: &ServeOptions) -> Result<(), ServeError> {
        let selection = Selection::resolve(&self.registry, &opts.components)?;
        let config = Config::load(&opts.config).await?;
        self.launch(&selection, &config, opts.coordinator_dir.as_deref())
            .await
    }

    /// Starts the optional coordinator, constructs the selected components and
    /// runs them until the first outcome.
    pub async fn launch(
        &self,
        selection: &Selection,
        config: &Config,
        coordinator_dir: Option<&Path>,
    ) -> Result<(), ServeError> {
        let coordinator = match coordinator_dir {
            Some(dir) => Some(self.start_coordinator(dir).await?),
            None => None,
        };

        let built = self
            .construct(selection, config, coordinator.as_deref())
            .and_then(|handles| {
                if handles.is_empty() {
                    Err(ServeError::NoComponents)
                } else {
                    Ok(handles)
                }
            });
        let mut handles = match built {
            Ok(handles) => handles,
            Err(e) => {
                if let Some(coordinator) = &coordinator {
                    if let Err(close_err) = coordinator.close().await {
                        warn!(error = %close_err, "failed to close embedded coordinator");
                    }
                }
                return Err(e);
            }
        };

        if let Some(coordinator) = coordinator {
            handles.insert(0, Box::new(CoordinatorComponent::new(coordinator)));
        }
        self.supervise(handles).await
    }

    async fn start_coordinator(&self, dir: &Path) -> Result<Arc<EmbeddedCoordinator>, ServeError> {
        self.bus.publish(
            Event::new(EventKind::CoordinatorStarting).with_reason(dir.display().to_string()),
        );
        let coordinator = EmbeddedCoordinator::start(dir).await?;
        Ok(Arc::new(coordinator))
    }

    /// Calls the enabled constructors in catalog order; stops at the first error.
    fn construct(
        &self,
        selection: &Selection,
        config: &Config,
        coordinator: Option<&EmbeddedCoordinator>,
    ) -> Result<Vec<ComponentHandle>, ServeError> {
        let ctx = BuildContext {
            config,
            token: &self.runtime_token,
            coordinator: coordinator.map(EmbeddedCoordinator::store),
        };

        let mut built = Vec::new();
        for (name, build) in self.catalog.entries() {
            if !selection.is_enabled(name) {
                continue;
            }
            match build(&ctx) {
                Ok(handle) => {
                    self.bus
                        .publish(Event::new(EventKind::ComponentConstructed).with_component(name));
                    built.push(handle);
                }
                Err(source) => {
                    self.bus.publish(
                        Event::new(EventKind::ConstructionFailed)
                            .with_component(name)
                            .with_reason(source.to_string()),
                    );
                    return Err(ServeError::Construct {
                        component: name.to_string(),
                        source,
                    });
                }
            }
        }
        Ok(built)
    }

    /// Runs every handle concurrently and returns the first outcome.
    async fn supervise(&self, handles: Vec<ComponentHandle>) -> Result<(), ServeError> {
        if handles.is_empty() {
            return Err(ServeError::NoComponents);
        }

        let (tx, mut rx) = mpsc::channel::<Outcome>(handles.len());
        let mut set = JoinSet::new();
        for handle in handles {
            set.spawn(run_component(
                handle,
                self.runtime_token.clone(),
                self.bus.clone(),
                tx.clone(),
            ));
        }
        drop(tx);

        // Every path sends exactly one outcome, so `None` means nothing was launched.
        let Some(first) = rx.recv().await else {
            return Err(ServeError::NoComponents);
        };

        self.bus.publish(
            Event::new(EventKind::ShutdownRequested).with_component(Arc::clone(&first.component)),
        );
        self.runtime_token.cancel();
        self.wait_all_with_grace(&mut set).await;

        first.into_result()
    }

    /// Waits for the remaining paths within the grace period, then aborts the rest.
    async fn wait_all_with_grace(&self, set: &mut JoinSet<()>) {
        let done = async { while set.join_next().await.is_some() {} };

        let timed = tokio::time::timeout(self.cfg.grace, done).await;

        match timed {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
            }
            Err(_) => {
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_reason(set.len().to_string()),
                );
                set.abort_all();
            }
        }
    }

    /// Number of subscribers receiving runtime events.
    pub fn subscriber_count(&self) -> usize {
        self.subs.len()
    }

    /// Delivers the events already published to every subscriber, then stops
    /// the subscriber workers.
    ///
    /// Call once the launch has returned, before the process exits.
    pub async fn shutdown(self) {
        let Listener { handle, stop } = self.listener;
        stop.cancel();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "subscriber listener ended abnormally");
            }
        }
        match Arc::try_unwrap(self.subs) {
            Ok(subs) => subs.shutdown().await,
            Err(_) => warn!("subscriber set still shared; skipping drain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentFn;
    use crate::error::ComponentError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn blocking(name: &'static str) -> ComponentHandle {
        ComponentFn::boxed(name, |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err(ComponentError::Canceled)
        })
    }

    fn supervisor(catalog: Catalog) -> Supervisor {
        Supervisor::builder(catalog)
            .with_config(SupervisorConfig {
                grace: Duration::from_secs(1),
                ..SupervisorConfig::default()
            })
            .build()
    }

    #[tokio::test]
    async fn siblings_observe_cancellation_after_first_outcome() {
        let stopped = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&stopped);
        let catalog = Catalog::new()
            .with("waiter", move |_ctx: &BuildContext<'_>| {
                let s = Arc::clone(&s);
                Ok(ComponentFn::boxed("waiter", move |ctx: CancellationToken| {
                    let s = Arc::clone(&s);
                    async move {
                        ctx.cancelled().await;
                        s.fetch_add(1, Ordering::SeqCst);
                        Err(ComponentError::Canceled)
                    }
                }))
            })
            .with("quitter", |_ctx: &BuildContext<'_>| {
                Ok(ComponentFn::boxed("quitter", |_t: CancellationToken| async {
                    Err(ComponentError::failed("boom"))
                }))
            });
        let sup = supervisor(catalog);
        let sel = Selection::resolve(sup.registry(), ["all"]).unwrap();

        let err = sup.launch(&sel, &Config::default(), None).await.unwrap_err();
        assert_eq!(err.component(), Some("quitter"));
        assert_eq!(stopped.load(Ordering::SeqCst), 1);
        assert!(sup.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn clean_return_is_terminal() {
        let catalog = Catalog::new()
            .with("idle", |_ctx: &BuildContext<'_>| Ok(blocking("idle")))
            .with("done", |_ctx: &BuildContext<'_>| {
                Ok(ComponentFn::boxed("done", |_t: CancellationToken| async { Ok(()) }))
            });
        let sup = supervisor(catalog);
        let sel = Selection::resolve(sup.registry(), ["all"]).unwrap();

        assert!(sup.launch(&sel, &Config::default(), None).await.is_ok());
    }

    #[tokio::test]
    async fn external_cancellation_ends_the_wait_gracefully() {
        let catalog = Catalog::new().with("idle", |_ctx: &BuildContext<'_>| Ok(blocking("idle")));
        let sup = supervisor(catalog);
        let sel = Selection::resolve(sup.registry(), ["idle"]).unwrap();

        let token = sup.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        assert!(sup.launch(&sel, &Config::default(), None).await.is_ok());
    }

    #[tokio::test]
    async fn stragglers_are_aborted_after_grace() {
        let catalog = Catalog::new()
            .with("stubborn", |_ctx: &BuildContext<'_>| {
                Ok(ComponentFn::boxed("stubborn", |_t: CancellationToken| async {
                    std::future::pending::<()>().await;
                    Ok(())
                }))
            })
            .with("quitter", |_ctx: &BuildContext<'_>| {
                Ok(ComponentFn::boxed("quitter", |_t: CancellationToken| async {
                    Err(ComponentError::failed("boom"))
                }))
            });
        let sup = Supervisor::builder(catalog)
            .with_config(SupervisorConfig {
                grace: Duration::from_millis(20),
                ..SupervisorConfig::default()
            })
            .build();
        let mut events = sup.bus().subscribe();
        let sel = Selection::resolve(sup.registry(), ["all"]).unwrap();

        let err = sup.launch(&sel, &Config::default(), None).await.unwrap_err();
        assert_eq!(err.component(), Some("quitter"));

        let mut saw_grace_exceeded = false;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::GraceExceeded {
                saw_grace_exceeded = true;
                assert_eq!(ev.reason.as_deref(), Some("1"));
            }
        }
        assert!(saw_grace_exceeded);
    }

    #[tokio::test]
    async fn coordinator_store_reaches_constructors() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new().with("reader", |ctx: &BuildContext<'_>| {
            let store = ctx
                .coordinator
                .cloned()
                .ok_or_else(|| ComponentError::config("coordinator required"))?;
            Ok(ComponentFn::boxed("reader", move |_t: CancellationToken| {
                let store = store.clone();
                async move {
                    store.put("reader/seen", "yes").await;
                    Err(ComponentError::failed("done"))
                }
            }))
        });
        let sup = supervisor(catalog);
        let sel = Selection::resolve(sup.registry(), ["reader"]).unwrap();

        let err = sup
            .launch(&sel, &Config::default(), Some(dir.path()))
            .await
            .unwrap_err();
        assert_eq!(err.component(), Some("reader"));

        let reopened = EmbeddedCoordinator::start(dir.path()).await.unwrap();
        assert_eq!(
            reopened.store().get("reader/seen").await.unwrap().value,
            "yes"
        );
    }

    #[tokio::test]
    async fn construction_failure_closes_the_coordinator() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new()
            .with("reader", |ctx: &BuildContext<'_>| {
                assert!(ctx.coordinator.is_some());
                Ok(blocking("reader"))
            })
            .with("writer", |_ctx: &BuildContext<'_>| Err(ComponentError::config("rejected")));
        let sup = supervisor(catalog);
        let sel = Selection::resolve(sup.registry(), ["all"]).unwrap();

        let err = sup
            .launch(&sel, &Config::default(), Some(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::Construct { .. }));
        assert!(dir.path().join("snapshot.json").exists());
    }

    #[tokio::test]
    async fn canceled_without_shutdown_is_a_failure() {
        let catalog = Catalog::new()
            .with("idle", |_ctx: &BuildContext<'_>| Ok(blocking("idle")))
            .with("quitter", |_ctx: &BuildContext<'_>| {
                Ok(ComponentFn::boxed("quitter", |_t: CancellationToken| async {
                    Err(ComponentError::Canceled)
                }))
            });
        let sup = supervisor(catalog);
        let sel = Selection::resolve(sup.registry(), ["all"]).unwrap();

        let err = sup.launch(&sel, &Config::default(), None).await.unwrap_err();
        assert_eq!(err.as_label(), "serve_run");
        assert_eq!(err.component(), Some("quitter"));
    }

    #[tokio::test]
    async fn empty_launch_closes_the_coordinator() {
        let dir = tempfile::tempdir().unwrap();
        let sup = supervisor(Catalog::new());
        let sel = Selection::resolve(sup.registry(), ["all"]).unwrap();

        let res = tokio::time::timeout(
            Duration::from_secs(5),
            sup.launch(&sel, &Config::default(), Some(dir.path())),
        )
        .await
        .unwrap();
        assert!(matches!(res, Err(ServeError::NoComponents)));
        assert!(dir.path().join("snapshot.json").exists());
    }

    #[derive(Default)]
    struct Recorder {
        seen: std::sync::Mutex<Vec<EventKind>>,
    }

    #[async_trait::async_trait]
    impl crate::subscribers::Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn shutdown_delivers_final_events_to_subscribers() {
        let catalog = Catalog::new().with("quitter", |_ctx: &BuildContext<'_>| {
            Ok(ComponentFn::boxed("quitter", |_t: CancellationToken| async {
                Err(ComponentError::failed("boom"))
            }))
        });
        let recorder = Arc::new(Recorder::default());
        let sup = Supervisor::builder(catalog)
            .with_subscribers(vec![Arc::clone(&recorder) as Arc<dyn crate::subscribers::Subscribe>])
            .build();
        let sel = Selection::resolve(sup.registry(), ["quitter"]).unwrap();

        assert!(sup.launch(&sel, &Config::default(), None).await.is_err());
        sup.shutdown().await;

        let seen = recorder.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                EventKind::ComponentConstructed,
                EventKind::ComponentStarting,
                EventKind::ComponentFailed,
                EventKind::ShutdownRequested,
                EventKind::AllStoppedWithin,
            ]
        );
    }
}
