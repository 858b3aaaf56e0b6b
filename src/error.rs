//! Error types used by the nodevisor runtime.
//!
//! Two kinds of failure exist in this system:
//!
//! - [`SpawnError`] — a node's program could not be started; aborts the
//!   group start that raised it.
//! - [`RuntimeError`] — errors surfaced by [`Supervisor::run`](crate::Supervisor::run):
//!   an invalid topology or a propagated spawn failure.
//!
//! A service exiting early is *not* an error type — it is a monitor outcome
//! ([`RunOutcome::ServiceFailed`](crate::RunOutcome::ServiceFailed)), because
//! the run still ends through the normal shutdown path. Errors from
//! terminate/kill calls during shutdown are swallowed and logged, never
//! propagated.

use thiserror::Error;

/// # A node's program could not be spawned.
///
/// Carries the node name and the underlying OS error (program missing,
/// not executable, resource limits). Propagates out of the group start and
/// aborts the remaining startup of that group; shutdown still runs over
/// whatever was started before the failure.
#[derive(Error, Debug)]
#[error("failed to spawn node {node}: {source}")]
pub struct SpawnError {
    /// Name of the node whose program failed to start.
    pub node: String,
    /// The OS error returned by the spawn call.
    #[source]
    pub source: std::io::Error,
}

/// # Errors produced by the supervisor runtime.
///
/// These escape [`Supervisor::run`](crate::Supervisor::run) — unlike monitor
/// outcomes, they represent a run that could not proceed, and they map to a
/// non-zero exit status in the `nodevisor` binary.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The topology declares the same node name more than once.
    ///
    /// Names must be unique across the whole configuration (both groups):
    /// they identify processes in logs, events, and monitor results.
    #[error("duplicate node name in topology: {name}")]
    DuplicateNode {
        /// The repeated name.
        name: String,
    },

    /// A node failed to spawn during group startup.
    ///
    /// Shutdown has already run over the partially started groups by the
    /// time this is returned.
    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use nodevisor::RuntimeError;
    ///
    /// let err = RuntimeError::DuplicateNode { name: "Q1".into() };
    /// assert_eq!(err.as_label(), "runtime_duplicate_node");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::DuplicateNode { .. } => "runtime_duplicate_node",
            RuntimeError::Spawn(_) => "runtime_spawn_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::DuplicateNode { name } => {
                format!("duplicate node name: {name}")
            }
            RuntimeError::Spawn(e) => format!("spawn failed: node={} err={}", e.node, e.source),
        }
    }
}
