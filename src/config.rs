//! # Global runtime configuration.
//!
//! [`Config`] defines the supervisor's pacing: the inter-start stagger within
//! a group, the warm-up pause between the service and client groups, the
//! health-poll interval, the shutdown grace period, and the event bus
//! capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use nodevisor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.poll_interval = Duration::from_millis(250);
//! cfg.grace = Duration::from_secs(5);
//!
//! assert_eq!(cfg.stagger, Duration::from_millis(500));
//! ```

use std::time::Duration;

/// Global configuration for a supervised run.
///
/// Controls startup pacing, health polling, shutdown grace, and event bus
/// capacity. All values are explicit — there is no ambient/static state, so
/// tests can run with arbitrary pacing.
#[derive(Clone, Debug)]
pub struct Config {
    /// Delay between consecutive node starts within a group.
    ///
    /// Throttles simultaneous process creation and gives each node a head
    /// start before the next in order begins.
    pub stagger: Duration,
    /// Pause between starting the service group and the client group.
    ///
    /// This is the only readiness mechanism: there is no handshake with the
    /// nodes, so the pause approximates "services are ready". Tune it to the
    /// slowest service's startup time.
    pub warmup: Duration,
    /// Period between successive health checks in the monitoring loop.
    ///
    /// Bounds detection latency: a service failure is observed at most one
    /// interval after it happens.
    pub poll_interval: Duration,
    /// Time allowed for a process to exit after a graceful-termination
    /// request before it is force-killed.
    pub grace: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for Config {
    /// Provides the reference configuration:
    /// - `stagger = 500ms`
    /// - `warmup = 3s`
    /// - `poll_interval = 1s`
    /// - `grace = 2s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            stagger: Duration::from_millis(500),
            warmup: Duration::from_secs(3),
            poll_interval: Duration::from_secs(1),
            grace: Duration::from_secs(2),
            bus_capacity: 1024,
        }
    }
}
