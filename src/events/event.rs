//! # Lifecycle events emitted during a supervised run.
//!
//! The [`EventKind`] enum classifies event types across the run's phases:
//! - **Startup events**: node spawning (starting, spawned, spawn failed,
//!   group started)
//! - **Monitoring events**: client completion and service failure
//! - **Shutdown events**: interrupt observed, group teardown, final stop
//!
//! The [`Event`] struct carries additional metadata such as timestamps, node
//! name, pid, exit code, and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use nodevisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::ClientFinished)
//!     .with_node("K1")
//!     .with_code(0);
//!
//! assert_eq!(ev.kind, EventKind::ClientFinished);
//! assert_eq!(ev.node.as_deref(), Some("K1"));
//! assert_eq!(ev.code, Some(0));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of run lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Startup events ===
    /// A node is about to be spawned.
    ///
    /// Sets:
    /// - `node`: node name
    NodeStarting,

    /// A node's process was created.
    ///
    /// Sets:
    /// - `node`: node name
    /// - `pid`: OS process id, when known
    NodeSpawned,

    /// A node's program could not be spawned; the group start aborts.
    ///
    /// Sets:
    /// - `node`: node name
    /// - `reason`: the OS error
    SpawnFailed,

    /// Every service node has been spawned; the warm-up pause begins.
    ServicesStarted,

    /// Every client node has been spawned; monitoring begins.
    ClientsStarted,

    // === Monitoring events ===
    /// A client node exited; the pending set shrinks.
    ///
    /// Sets:
    /// - `node`: node name
    /// - `code`: exit code
    ClientFinished,

    /// A service node exited before all clients finished — fatal for the run.
    ///
    /// Sets:
    /// - `node`: node name
    /// - `code`: exit code
    ServiceFailed,

    // === Shutdown events ===
    /// An external interrupt was observed; the run unwinds to shutdown.
    ShutdownRequested,

    /// Two-phase teardown of one group begins.
    ///
    /// Sets:
    /// - `group`: `"clients"` or `"services"`
    GroupStopping,

    /// A terminate/kill call failed for one handle; teardown continues.
    ///
    /// Sets:
    /// - `node`: node name
    /// - `reason`: the swallowed error
    StopFailed,

    /// A node's exit was observed during teardown.
    ///
    /// Sets:
    /// - `node`: node name
    /// - `code`: exit code
    NodeStopped,

    /// Both groups have been torn down; the run is over.
    AllStopped,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the node, if applicable.
    pub node: Option<Arc<str>>,
    /// Group label (`"services"` / `"clients"`), if applicable.
    pub group: Option<Arc<str>>,
    /// OS process id, if known at emit time.
    pub pid: Option<u32>,
    /// Observed exit code.
    pub code: Option<i32>,
    /// Human-readable reason (spawn errors, swallowed stop errors).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            node: None,
            group: None,
            pid: None,
            code: None,
            reason: None,
        }
    }

    /// Attaches a node name.
    #[inline]
    pub fn with_node(mut self, node: impl Into<Arc<str>>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Attaches a group label.
    #[inline]
    pub fn with_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Attaches an OS process id.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches an observed exit code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
