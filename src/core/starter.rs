//! # Group starter: ordered, staggered launch of one node group.
//!
//! Starts nodes strictly in group order, sleeping
//! [`Config::stagger`](crate::Config::stagger) between consecutive starts.
//! The stagger throttles simultaneous process creation and gives each node a
//! head start before its dependents (next in order) begin — there is no
//! readiness handshake to wait on.
//!
//! ## Rules
//! - Each spawned handle is pushed into the caller's list **before** the
//!   next node is attempted, so a spawn failure leaves the already started
//!   prefix available for teardown.
//! - A [`SpawnError`] aborts the whole group start and propagates; whatever
//!   started before the failure is left running and is the caller's
//!   responsibility to shut down.
//! - Cancellation (interrupt) stops further starts and returns `Ok`; the
//!   caller observes the token itself and proceeds to shutdown.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::handle::NodeHandle;
use crate::core::launcher::Launch;
use crate::error::SpawnError;
use crate::events::{Bus, Event, EventKind};
use crate::nodes::NodeSpec;

/// Starts `group` in order with `stagger` between consecutive starts,
/// appending each handle to `started` as it spawns.
pub(crate) async fn start_group(
    launcher: &dyn Launch,
    group: &[NodeSpec],
    stagger: Duration,
    token: &CancellationToken,
    bus: &Bus,
    started: &mut Vec<NodeHandle>,
) -> Result<(), SpawnError> {
    for (i, spec) in group.iter().enumerate() {
        if token.is_cancelled() {
            return Ok(());
        }

        bus.publish(Event::now(EventKind::NodeStarting).with_node(spec.name()));

        let handle = match launcher.launch(spec).await {
            Ok(handle) => handle,
            Err(err) => {
                bus.publish(
                    Event::now(EventKind::SpawnFailed)
                        .with_node(spec.name())
                        .with_reason(err.source.to_string()),
                );
                return Err(err);
            }
        };

        let mut spawned = Event::now(EventKind::NodeSpawned).with_node(handle.name());
        if let Some(pid) = handle.pid() {
            spawned = spawned.with_pid(pid);
        }
        bus.publish(spawned);
        started.push(handle);

        if i + 1 < group.len() && !sleep_unless_cancelled(stagger, token).await {
            return Ok(());
        }
    }
    Ok(())
}

/// Sleeps for `dur` unless the token cancels first.
///
/// Returns `true` if the full duration elapsed, `false` on cancellation.
pub(crate) async fn sleep_unless_cancelled(dur: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(dur) => true,
        _ = token.cancelled() => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeLauncher;
    use crate::nodes::NodeSpec;
    use tokio::time::Instant;

    fn group(names: &[&str]) -> Vec<NodeSpec> {
        names.iter().map(|n| NodeSpec::new(*n, "/bin/true")).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_all_nodes_in_order() {
        let launcher = FakeLauncher::new().with_running(&["A", "B", "C"]);
        let bus = Bus::new(16);
        let token = CancellationToken::new();
        let mut started = Vec::new();

        let begin = Instant::now();
        start_group(
            &launcher,
            &group(&["A", "B", "C"]),
            Duration::from_millis(500),
            &token,
            &bus,
            &mut started,
        )
        .await
        .unwrap();

        let names: Vec<&str> = started.iter().map(NodeHandle::name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        // Two inter-start pauses for three nodes.
        assert!(begin.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_failure_aborts_and_keeps_prefix() {
        let launcher = FakeLauncher::new().with_running(&["A", "C"]).with_failure("B");
        let bus = Bus::new(16);
        let token = CancellationToken::new();
        let mut started = Vec::new();

        let err = start_group(
            &launcher,
            &group(&["A", "B", "C"]),
            Duration::from_millis(500),
            &token,
            &bus,
            &mut started,
        )
        .await
        .unwrap_err();

        assert_eq!(err.node, "B");
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].name(), "A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_further_starts() {
        let launcher = FakeLauncher::new().with_running(&["A", "B"]);
        let bus = Bus::new(16);
        let token = CancellationToken::new();
        token.cancel();
        let mut started = Vec::new();

        start_group(
            &launcher,
            &group(&["A", "B"]),
            Duration::from_millis(500),
            &token,
            &bus,
            &mut started,
        )
        .await
        .unwrap();

        assert!(started.is_empty());
    }
}
