//! # Background service shell.
//!
//! [`TickerService`] wakes up at a fixed interval until cancelled. It stands in
//! for components without a network surface (scheduler, notification).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::components::Component;
use crate::error::ComponentError;

/// Periodic background component.
pub struct TickerService {
    name: String,
    interval: Duration,
    ticks: AtomicU64,
}

impl TickerService {
    /// Rejects a zero interval.
    pub fn new(name: impl Into<String>, interval_ms: u64) -> Result<Self, ComponentError> {
        let name = name.into();
        if interval_ms == 0 {
            return Err(ComponentError::config(format!(
                "{name}: interval_ms must be greater than 0"
            )));
        }
        Ok(Self {
            name,
            interval: Duration::from_millis(interval_ms),
            ticks: AtomicU64::new(0),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Component for TickerService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), ComponentError> {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Err(ComponentError::Canceled),
                _ = interval.tick() => {
                    let n = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
                    trace!(component = %self.name, tick = n, "tick");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_is_rejected() {
        let err = TickerService::new("scheduler", 0).err().unwrap();
        assert_eq!(
            err.to_string(),
            "invalid configuration: scheduler: interval_ms must be greater than 0"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_cancelled() {
        let svc = std::sync::Arc::new(TickerService::new("notification", 100).unwrap());
        let token = CancellationToken::new();
        let run = tokio::spawn({
            let svc = std::sync::Arc::clone(&svc);
            let token = token.clone();
            async move { svc.run(token).await }
        });

        time::sleep(Duration::from_millis(350)).await;
        token.cancel();

        assert!(run.await.unwrap().unwrap_err().is_canceled());
        assert!(svc.ticks() >= 3);
    }
}
