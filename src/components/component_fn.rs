//! # Function-backed component (`ComponentFn`)
//!
//! [`ComponentFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing
//! the component's run future on demand. Handy for tests and for embedding
//! small services without a dedicated type.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use servicevisor::{ComponentFn, ComponentHandle, ComponentError};
//!
//! let c: ComponentHandle = ComponentFn::boxed("worker", |ctx: CancellationToken| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, ComponentError>(())
//! });
//!
//! assert_eq!(c.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::components::component::{Component, ComponentHandle};
use crate::error::ComponentError;

/// Function-backed component implementation.
#[derive(Debug)]
pub struct ComponentFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ComponentFn<F> {
    /// Creates a new function-backed component.
    ///
    /// Prefer [`ComponentFn::boxed`] when you immediately need a [`ComponentHandle`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> ComponentFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    /// Creates the component and returns it as an owned handle.
    pub fn boxed(name: impl Into<Cow<'static, str>>, f: F) -> ComponentHandle {
        Box::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Component for ComponentFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), ComponentError> {
        (self.f)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_the_closure_with_the_given_token() {
        let c = ComponentFn::boxed("echo", |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                Err(ComponentError::Canceled)
            } else {
                Err(ComponentError::failed("not cancelled"))
            }
        });

        let token = CancellationToken::new();
        token.cancel();
        let err = c.run(token).await.unwrap_err();
        assert!(err.is_canceled());
    }
}
