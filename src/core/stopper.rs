//! # Shutdown coordinator: two-phase teardown of one node group.
//!
//! Issues a graceful-termination request to every handle in list order,
//! waits the grace period, then force-kills anything still alive. Invoked
//! twice per run — clients first, then services — reflecting
//! reverse-of-dependency teardown order, and on **every** path out of a run
//! (normal completion, service failure, spawn failure, interrupt).
//!
//! ## Rules
//! - Per-handle errors (process already gone) are logged and swallowed;
//!   they never abort the remaining teardown steps.
//! - Safe on an empty or partially constructed list.
//! - Idempotent: handles whose exit is already recorded are no-ops, so
//!   stopping an already-stopped group produces nothing but log lines.
//! - The grace wait is not cancellable — teardown always runs both phases.

use std::time::Duration;

use crate::core::handle::NodeHandle;
use crate::events::{Bus, Event, EventKind};

/// Two-phase stop of `handles`: terminate all, wait `grace`, kill survivors.
///
/// Finishes with a reap poll so exit codes observed during teardown are
/// recorded on the handles and published as [`EventKind::NodeStopped`].
pub(crate) async fn stop_group(
    group: &str,
    handles: &mut [NodeHandle],
    grace: Duration,
    bus: &Bus,
) {
    if handles.is_empty() {
        return;
    }

    bus.publish(Event::now(EventKind::GroupStopping).with_group(group));

    for handle in handles.iter_mut() {
        if let Err(err) = handle.terminate() {
            log::debug!("terminate for node {} failed: {err}", handle.name());
            bus.publish(
                Event::now(EventKind::StopFailed)
                    .with_node(handle.name())
                    .with_reason(err.to_string()),
            );
        }
    }

    tokio::time::sleep(grace).await;

    for handle in handles.iter_mut() {
        if let Err(err) = handle.force_kill() {
            log::debug!("kill for node {} failed: {err}", handle.name());
            bus.publish(
                Event::now(EventKind::StopFailed)
                    .with_node(handle.name())
                    .with_reason(err.to_string()),
            );
        }
    }

    for handle in handles.iter_mut() {
        let already = handle.has_exited();
        if let Some(code) = handle.poll() {
            if !already {
                bus.publish(
                    Event::now(EventKind::NodeStopped)
                        .with_node(handle.name())
                        .with_code(code),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeChild;
    use tokio::time::Instant;

    fn handle(name: &str, child: FakeChild) -> NodeHandle {
        NodeHandle::new(name, Box::new(child))
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_phases_reach_stubborn_handles() {
        let (child, state) = FakeChild::stubborn();
        let mut handles = vec![handle("S1", child)];
        let bus = Bus::new(16);

        stop_group("services", &mut handles, Duration::from_secs(2), &bus).await;

        let s = state.lock().unwrap();
        assert!(s.terminated);
        assert!(s.killed);
        drop(s);
        assert_eq!(handles[0].exit_code(), Some(-9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exited_handle_is_a_no_op_among_live_ones() {
        let (done, done_state) = FakeChild::exits_after(1, 0);
        let (live, live_state) = FakeChild::stubborn();
        let mut handles = vec![handle("K1", done), handle("K2", live)];
        handles[0].poll();
        let bus = Bus::new(16);

        stop_group("clients", &mut handles, Duration::from_secs(2), &bus).await;

        assert!(!done_state.lock().unwrap().terminated);
        let live = live_state.lock().unwrap();
        assert!(live.terminated);
        assert!(live.killed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_twice_is_idempotent() {
        let (child, state) = FakeChild::running();
        let mut handles = vec![handle("S1", child)];
        let bus = Bus::new(16);

        stop_group("services", &mut handles, Duration::from_secs(2), &bus).await;
        let code_after_first = handles[0].exit_code();
        stop_group("services", &mut handles, Duration::from_secs(2), &bus).await;

        // SIGTERM took effect in the first pass; the second pass never
        // touches the child again.
        assert_eq!(handles[0].exit_code(), code_after_first);
        assert_eq!(state.lock().unwrap().terminations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_list_returns_without_waiting() {
        let mut handles = Vec::new();
        let bus = Bus::new(16);

        let begin = Instant::now();
        stop_group("clients", &mut handles, Duration::from_secs(2), &bus).await;
        assert_eq!(begin.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_errors_are_swallowed() {
        let (child, _state) = FakeChild::unstoppable();
        let mut handles = vec![handle("S1", child)];
        let bus = Bus::new(16);
        let mut events = bus.subscribe();

        stop_group("services", &mut handles, Duration::from_secs(2), &bus).await;

        // GroupStopping, then a StopFailed per phase.
        let mut stop_failures = 0;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::StopFailed {
                stop_failures += 1;
            }
        }
        assert_eq!(stop_failures, 2);
    }
}
