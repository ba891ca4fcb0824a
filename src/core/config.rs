//! # Supervisor runtime configuration.
//!
//! Provides [`SupervisorConfig`], the settings of the supervisor itself (as
//! opposed to the component [`Config`](crate::Config) bundle).
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait for siblings after the first outcome; abort them
//! - `bus_capacity = 0` → clamped to 1 by the bus

use std::time::Duration;

/// Runtime settings of a [`Supervisor`](crate::Supervisor).
///
/// ## Field semantics
/// - `grace`: how long to wait for the remaining components after the first
///   outcome cancelled the root token
/// - `bus_capacity`: event bus ring buffer size
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Maximum wait for remaining components to stop after the first outcome.
    ///
    /// Components still running afterwards are aborted.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages skip
    /// older items.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}
