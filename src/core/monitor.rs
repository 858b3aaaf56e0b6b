//! # Health monitor: the run's termination-detection loop.
//!
//! Polls every handle at a fixed interval and declares the run over on the
//! first of two events: any service handle exits unexpectedly, or every
//! client handle has exited.
//!
//! ## Rules
//! - Services are checked **first** in every tick: a service exit wins over
//!   "all clients finished" observed in the same tick. A mid-pipeline node
//!   disappearing invalidates in-flight work for every other node, so it is
//!   fatal and never retried.
//! - A finished client is never restarted; its exit code is recorded on the
//!   handle and published as [`EventKind::ClientFinished`].
//! - Detection latency is bounded by the poll interval — up to one interval
//!   between a service dying and the monitor reporting it.
//! - Interruption is handled one level up: the supervisor races this loop
//!   against the run's cancellation token.

use std::sync::Arc;
use std::time::Duration;

use crate::core::handle::NodeHandle;
use crate::events::{Bus, Event, EventKind};

/// Why the monitoring loop declared the run over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CompletionReason {
    /// Every client handle has exited.
    ClientsFinished,
    /// A service handle exited while clients were still pending.
    ServiceFailed {
        /// Name of the failed service node.
        node: Arc<str>,
        /// Its observed exit code.
        code: i32,
    },
}

/// Polls until all clients finish or any service exits.
///
/// With no pending clients (including an empty client group) this returns
/// [`CompletionReason::ClientsFinished`] without sleeping.
pub(crate) async fn wait_for_completion(
    services: &mut [NodeHandle],
    clients: &mut [NodeHandle],
    poll_interval: Duration,
    bus: &Bus,
) -> CompletionReason {
    loop {
        if clients.iter().all(NodeHandle::has_exited) {
            return CompletionReason::ClientsFinished;
        }

        tokio::time::sleep(poll_interval).await;

        for service in services.iter_mut() {
            if let Some(code) = service.poll() {
                bus.publish(
                    Event::now(EventKind::ServiceFailed)
                        .with_node(service.name())
                        .with_code(code),
                );
                return CompletionReason::ServiceFailed {
                    node: service.name_shared(),
                    code,
                };
            }
        }

        for client in clients.iter_mut() {
            if client.has_exited() {
                continue;
            }
            if let Some(code) = client.poll() {
                bus.publish(
                    Event::now(EventKind::ClientFinished)
                        .with_node(client.name())
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
    async fn test_clients_finished_when_all_exit() {
        let (svc, _s) = FakeChild::running();
        let (cli, _c) = FakeChild::exits_after(2, 0);
        let mut services = vec![handle("S1", svc)];
        let mut clients = vec![handle("K1", cli)];
        let bus = Bus::new(16);

        let begin = Instant::now();
        let reason = wait_for_completion(
            &mut services,
            &mut clients,
            Duration::from_secs(1),
            &bus,
        )
        .await;

        assert_eq!(reason, CompletionReason::ClientsFinished);
        assert_eq!(clients[0].exit_code(), Some(0));
        // Client exits on the second poll: two intervals elapse.
        assert!(begin.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_exit_is_fatal_within_one_interval() {
        let (svc, _s) = FakeChild::exits_after(1, 1);
        let (cli, _c) = FakeChild::running();
        let mut services = vec![handle("S1", svc)];
        let mut clients = vec![handle("K1", cli)];
        let bus = Bus::new(16);

        let begin = Instant::now();
        let reason = wait_for_completion(
            &mut services,
            &mut clients,
            Duration::from_secs(1),
            &bus,
        )
        .await;

        assert_eq!(
            reason,
            CompletionReason::ServiceFailed {
                node: "S1".into(),
                code: 1
            }
        );
        assert!(begin.elapsed() >= Duration::from_secs(1));
        assert!(begin.elapsed() < Duration::from_secs(2));
        assert!(!clients[0].has_exited());
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_exit_wins_over_clients_in_same_tick() {
        let (svc, _s) = FakeChild::exits_after(1, 9);
        let (cli, _c) = FakeChild::exits_after(1, 0);
        let mut services = vec![handle("S1", svc)];
        let mut clients = vec![handle("K1", cli)];
        let bus = Bus::new(16);

        let reason = wait_for_completion(
            &mut services,
            &mut clients,
            Duration::from_secs(1),
            &bus,
        )
        .await;

        assert!(matches!(reason, CompletionReason::ServiceFailed { code: 9, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_client_group_finishes_immediately() {
        let (svc, _s) = FakeChild::running();
        let mut services = vec![handle("S1", svc)];
        let mut clients = Vec::new();
        let bus = Bus::new(16);

        let begin = Instant::now();
        let reason = wait_for_completion(
            &mut services,
            &mut clients,
            Duration::from_secs(1),
            &bus,
        )
        .await;

        assert_eq!(reason, CompletionReason::ClientsFinished);
        assert_eq!(begin.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_multiple_clients_drain_independently() {
        let (svc, _s) = FakeChild::running();
        let (c1, _c1) = FakeChild::exits_after(1, 0);
        let (c2, _c2) = FakeChild::exits_after(3, 2);
        let mut services = vec![handle("S1", svc)];
        let mut clients = vec![handle("K1", c1), handle("K2", c2)];
        let bus = Bus::new(16);

        let reason = wait_for_completion(
            &mut services,
            &mut clients,
            Duration::from_secs(1),
            &bus,
        )
        .await;

        assert_eq!(reason, CompletionReason::ClientsFinished);
        assert_eq!(clients[0].exit_code(), Some(0));
        assert_eq!(clients[1].exit_code(), Some(2));
    }
}
