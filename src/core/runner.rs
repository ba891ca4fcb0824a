//! # One execution path per component.
//!
//! [`run_component`] drives a single constructed component to its terminal
//! outcome and reports it on the outcome channel.
//!
//! ## Event flow
//!
//! ```text
//! publish ComponentStarting
//!   component.run(root) → Ok(())                      → publish ComponentStopped
//!                       → Err(Canceled), root cancelled → publish ComponentStopped (graceful exit)
//!                       → Err(Canceled), root live     → publish ComponentFailed
//!                       → Err(other) / panic          → publish ComponentFailed
//! send Outcome { component, result, root_cancelled }
//! ```
//!
//! ## Rules
//! - Always sends **exactly one** outcome, even when the component panics
//! - The root token is passed as is; cancelling it is the supervisor's job

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    components::ComponentHandle,
    core::panic_message,
    error::{ComponentError, ServeError},
    events::{Bus, Event, EventKind},
};

/// Terminal result of one execution path.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) component: Arc<str>,
    pub(crate) result: Result<(), ComponentError>,
    /// Whether the root token was cancelled when the component returned.
    pub(crate) root_cancelled: bool,
}

impl Outcome {
    /// Maps the outcome to the supervisor's terminal result.
    ///
    /// A clean return ends the process without error. `Canceled` does too, but
    /// only once the root token was cancelled; otherwise it is a failure.
    pub(crate) fn into_result(self) -> Result<(), ServeError> {
        let graceful = self.is_graceful();
        match self.result {
            Err(source) if !graceful => Err(ServeError::Run {
                component: self.component.to_string(),
                source,
            }),
            _ => Ok(()),
        }
    }

    fn is_graceful(&self) -> bool {
        match &self.result {
            Ok(()) => true,
            Err(e) => e.is_canceled() && self.root_cancelled,
        }
    }
}

/// Runs `component` until it returns and sends its outcome to `outcomes`.
pub(crate) async fn run_component(
    component: ComponentHandle,
    root: CancellationToken,
    bus: Bus,
    outcomes: mpsc::Sender<Outcome>,
) {
    let name: Arc<str> = Arc::from(component.name());
    bus.publish(Event::new(EventKind::ComponentStarting).with_component(Arc::clone(&name)));

    let result = match AssertUnwindSafe(component.run(root.clone()))
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(panic_err) => Err(ComponentError::Panicked {
            info: panic_message(panic_err.as_ref()),
        }),
    };

    let outcome = Outcome {
        component: Arc::clone(&name),
        result,
        root_cancelled: root.is_cancelled(),
    };
    match &outcome.result {
        Err(e) if !outcome.is_graceful() => publish_failed(&bus, &name, e),
        _ => publish_stopped(&bus, &name),
    }

    let _ = outcomes.send(outcome).await;
}

/// Publishes `ComponentStopped` (clean return or graceful cancellation).
fn publish_stopped(bus: &Bus, name: &Arc<str>) {
    bus.publish(Event::new(EventKind::ComponentStopped).with_component(Arc::clone(name)));
}

/// Publishes `ComponentFailed` with error details.
fn publish_failed(bus: &Bus, name: &Arc<str>, err: &ComponentError) {
    bus.publish(
        Event::new(EventKind::ComponentFailed)
            .with_component(Arc::clone(name))
            .with_reason(err.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentFn;

    async fn explode(_ctx: CancellationToken) -> Result<(), ComponentError> {
        panic!("exploded")
    }

    #[tokio::test]
    async fn panic_becomes_a_failed_outcome() {
        let bus = Bus::new(16);
        let mut events = bus.subscribe();
        let (tx, mut rx) = mpsc::channel(1);

        let component = ComponentFn::boxed("boom", explode);
        run_component(component, CancellationToken::new(), bus, tx).await;

        let outcome = rx.recv().await.unwrap();
        assert_eq!(&*outcome.component, "boom");
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.to_string(), "component boom exited: panicked: exploded");

        assert_eq!(events.recv().await.unwrap().kind, EventKind::ComponentStarting);
        assert_eq!(events.recv().await.unwrap().kind, EventKind::ComponentFailed);
    }

    #[tokio::test]
    async fn cancellation_is_a_graceful_outcome() {
        let bus = Bus::new(16);
        let mut events = bus.subscribe();
        let (tx, mut rx) = mpsc::channel(1);
        let root = CancellationToken::new();
        root.cancel();

        let component = ComponentFn::boxed("idle", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err(ComponentError::Canceled)
        });
        run_component(component, root, bus, tx).await;

        assert!(rx.recv().await.unwrap().into_result().is_ok());
        assert_eq!(events.recv().await.unwrap().kind, EventKind::ComponentStarting);
        assert_eq!(events.recv().await.unwrap().kind, EventKind::ComponentStopped);
    }

    #[tokio::test]
    async fn canceled_without_root_cancellation_is_a_failure() {
        let bus = Bus::new(16);
        let mut events = bus.subscribe();
        let (tx, mut rx) = mpsc::channel(1);

        let component = ComponentFn::boxed("quitter", |_ctx: CancellationToken| async {
            Err(ComponentError::Canceled)
        });
        run_component(component, CancellationToken::new(), bus, tx).await;

        let err = rx.recv().await.unwrap().into_result().unwrap_err();
        assert_eq!(err.component(), Some("quitter"));
        assert_eq!(err.to_string(), "component quitter exited: context cancelled");
        assert_eq!(events.recv().await.unwrap().kind, EventKind::ComponentStarting);
        assert_eq!(events.recv().await.unwrap().kind, EventKind::ComponentFailed);
    }
}
