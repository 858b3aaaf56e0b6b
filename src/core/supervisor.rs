//! # Supervisor: drives one run of the pipeline from launch to teardown.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], and the run
//! configuration. It starts the service group, waits out the warm-up, starts
//! the client group, monitors until the run is over, and then — on **every**
//! path — tears both groups down.
//!
//! ## State machine
//! ```text
//! INIT ─► STARTING_SERVICES ─► WARMUP ─► STARTING_CLIENTS ─► MONITORING ─► SHUTTING_DOWN ─► STOPPED
//!              │                  │             │                 │
//!              │ spawn failure    │ interrupt   │ spawn failure   │ service failed /
//!              │ or interrupt     │             │ or interrupt    │ clients finished /
//!              ▼                  ▼             ▼                 ▼ interrupt
//!            SHUTTING_DOWN ◄──────┴─────────────┴─────────────────┘
//! ```
//! Shutdown is the universal finalizer: it always executes, with whatever
//! subset of the service/client lists exists at that point (possibly empty),
//! clients first, then services.
//!
//! ## Shutdown path
//! ```text
//! shutdown::wait_for_shutdown_signal()      (interrupt bridge task)
//!           └─► Bus.publish(ShutdownRequested)
//!           └─► run token.cancel()   → observed at every suspension point
//!
//! any outcome
//!           └─► stopper::stop_group(clients)   terminate → grace → kill
//!           └─► stopper::stop_group(services)  terminate → grace → kill
//!           └─► Bus.publish(AllStopped)
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use nodevisor::{
//!     Config, LogWriter, NodeSpec, ProcessLauncher, Subscribe, Supervisor, Topology,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let topology = Topology::new(
//!         vec![NodeSpec::new("Q1", "./q1-node")],
//!         vec![NodeSpec::new("K1", "./client")],
//!     );
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
//!     let sup = Supervisor::new(Config::default(), subs);
//!
//!     let outcome = sup.run(&topology, &ProcessLauncher).await?;
//!     println!("run ended: {outcome:?}");
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::handle::NodeHandle;
use crate::core::launcher::Launch;
use crate::core::monitor::{self, CompletionReason};
use crate::core::starter::{self, sleep_unless_cancelled};
use crate::core::{shutdown, stopper};
use crate::error::{RuntimeError, SpawnError};
use crate::events::{Bus, Event, EventKind};
use crate::nodes::Topology;
use crate::subscribers::{Subscribe, SubscriberSet};

/// How a completed run ended.
///
/// All three variants are `Ok` outcomes of [`Supervisor::run`]: the run
/// reached shutdown and both groups were torn down. Only errors that abort
/// the sequence itself ([`RuntimeError`]) are returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every client node exited; the pipeline's work is done.
    ClientsFinished,
    /// A service node exited while clients were still pending; the run was
    /// cut short.
    ServiceFailed {
        /// Name of the failed service node.
        node: Arc<str>,
        /// Its observed exit code.
        code: i32,
    },
    /// An external interrupt ended the run early but cleanly.
    Interrupted,
}

impl From<CompletionReason> for RunOutcome {
    fn from(reason: CompletionReason) -> Self {
        match reason {
            CompletionReason::ClientsFinished => RunOutcome::ClientsFinished,
            CompletionReason::ServiceFailed { node, code } => {
                RunOutcome::ServiceFailed { node, code }
            }
        }
    }
}

/// The handle lists of one run, built during startup and consumed by
/// teardown.
#[derive(Default)]
struct RunSet {
    services: Vec<NodeHandle>,
    clients: Vec<NodeHandle>,
}

/// Coordinates startup sequencing, health monitoring, and teardown for one
/// pipeline run.
pub struct Supervisor {
    /// Run configuration.
    pub cfg: Config,
    /// Event bus shared with all phases.
    pub bus: Bus,
    /// Fan-out set for subscribers.
    pub subs: Arc<SubscriberSet>,
}

impl Supervisor {
    /// Creates a new supervisor with the given config and subscribers.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(subscribers));
        Self { cfg, bus, subs }
    }

    /// Runs the topology until all clients finish, a service fails, or an OS
    /// termination signal arrives — then tears everything down.
    ///
    /// Intended to be called once per supervisor instance.
    pub async fn run(
        &self,
        topology: &Topology,
        launcher: &dyn Launch,
    ) -> Result<RunOutcome, RuntimeError> {
        let token = CancellationToken::new();
        self.interrupt_bridge(&token);
        self.run_with_shutdown(topology, launcher, token).await
    }

    /// Like [`run`](Supervisor::run), but shutdown is triggered by the given
    /// token instead of OS signals.
    ///
    /// The embedding seam: cancel `shutdown` from anywhere to end the run
    /// early through the same orderly teardown path.
    pub async fn run_with_shutdown(
        &self,
        topology: &Topology,
        launcher: &dyn Launch,
        shutdown: CancellationToken,
    ) -> Result<RunOutcome, RuntimeError> {
        topology.validate()?;
        self.subscriber_listener();

        let mut run = RunSet::default();
        let outcome = self.drive(&mut run, topology, launcher, &shutdown).await;

        // Universal finalizer: whatever happened above, stop clients first,
        // then services.
        stopper::stop_group("clients", &mut run.clients, self.cfg.grace, &self.bus).await;
        stopper::stop_group("services", &mut run.services, self.cfg.grace, &self.bus).await;
        self.bus.publish(Event::now(EventKind::AllStopped));

        outcome.map_err(RuntimeError::from)
    }

    /// Startup and monitoring phases; returns as soon as the run's fate is
    /// known, leaving teardown to the caller.
    async fn drive(
        &self,
        run: &mut RunSet,
        topology: &Topology,
        launcher: &dyn Launch,
        token: &CancellationToken,
    ) -> Result<RunOutcome, SpawnError> {
        // STARTING_SERVICES
        starter::start_group(
            launcher,
            &topology.services,
            self.cfg.stagger,
            token,
            &self.bus,
            &mut run.services,
        )
        .await?;
        if token.is_cancelled() {
            return Ok(RunOutcome::Interrupted);
        }
        self.bus.publish(Event::now(EventKind::ServicesStarted));

        // WARMUP — the stand-in for a readiness handshake.
        if !sleep_unless_cancelled(self.cfg.warmup, token).await {
            return Ok(RunOutcome::Interrupted);
        }

        // STARTING_CLIENTS
        starter::start_group(
            launcher,
            &topology.clients,
            self.cfg.stagger,
            token,
            &self.bus,
            &mut run.clients,
        )
        .await?;
        if token.is_cancelled() {
            return Ok(RunOutcome::Interrupted);
        }
        self.bus.publish(Event::now(EventKind::ClientsStarted));

        // MONITORING
        tokio::select! {
            reason = monitor::wait_for_completion(
                &mut run.services,
                &mut run.clients,
                self.cfg.poll_interval,
                &self.bus,
            ) => Ok(reason.into()),
            _ = token.cancelled() => Ok(RunOutcome::Interrupted),
        }
    }

    /// Converts an OS termination signal into cancellation of the run token.
    fn interrupt_bridge(&self, token: &CancellationToken) {
        let bus = self.bus.clone();
        let token = token.clone();
        tokio::spawn(async move {
            match shutdown::wait_for_shutdown_signal().await {
                Ok(()) => {
                    bus.publish(Event::now(EventKind::ShutdownRequested));
                    token.cancel();
                }
                Err(err) => log::warn!("signal registration failed: {err}"),
            }
        });
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{FakeChild, FakeLauncher};
    use crate::nodes::NodeSpec;
    use std::time::Duration;

    fn topology(services: &[&str], clients: &[&str]) -> Topology {
        let spec = |n: &&str| NodeSpec::new(*n, "/bin/true");
        Topology::new(
            services.iter().map(spec).collect(),
            clients.iter().map(spec).collect(),
        )
    }

    fn fast_cfg() -> Config {
        Config {
            stagger: Duration::from_millis(500),
            warmup: Duration::from_secs(3),
            poll_interval: Duration::from_secs(1),
            grace: Duration::from_secs(2),
            bus_capacity: 64,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_completes_when_clients_finish() {
        let (client, client_state) = FakeChild::exits_after(2, 0);
        let launcher = FakeLauncher::new()
            .with_running(&["S1", "S2"])
            .with_child("K1", client, Arc::clone(&client_state));
        let sup = Supervisor::new(fast_cfg(), vec![]);

        let outcome = sup
            .run_with_shutdown(
                &topology(&["S1", "S2"], &["K1"]),
                &launcher,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::ClientsFinished);
        // Client already exited: teardown never signalled it.
        let k1 = client_state.lock().unwrap();
        assert_eq!(k1.exit_code, Some(0));
        assert!(!k1.terminated && !k1.killed);
        // Both services were asked to stop and went down gracefully.
        for name in ["S1", "S2"] {
            let s = launcher.state_of(name);
            let s = s.lock().unwrap();
            assert!(s.terminated);
            assert_eq!(s.exit_code, Some(-15));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_failure_ends_run_and_stops_clients() {
        let (svc, svc_state) = FakeChild::exits_after(1, 1);
        let launcher = FakeLauncher::new()
            .with_child("S1", svc, svc_state)
            .with_running(&["K1"]);
        let sup = Supervisor::new(fast_cfg(), vec![]);

        let outcome = sup
            .run_with_shutdown(
                &topology(&["S1"], &["K1"]),
                &launcher,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::ServiceFailed {
                node: "S1".into(),
                code: 1
            }
        );
        // The still-running client was torn down anyway.
        assert!(launcher.state_of("K1").lock().unwrap().terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_failure_propagates_after_teardown() {
        let launcher = FakeLauncher::new().with_running(&["S1"]).with_failure("S2");
        let sup = Supervisor::new(fast_cfg(), vec![]);

        let err = sup
            .run_with_shutdown(
                &topology(&["S1", "S2"], &["K1"]),
                &launcher,
                CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.as_label(), "runtime_spawn_failed");
        // The started prefix was still shut down.
        assert!(launcher.state_of("S1").lock().unwrap().terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_during_monitoring_tears_down() {
        let launcher = FakeLauncher::new().with_running(&["S1", "K1"]);
        let sup = Supervisor::new(fast_cfg(), vec![]);
        let token = CancellationToken::new();

        let cancel = token.clone();
        tokio::spawn(async move {
            // Fires mid-monitoring: past stagger + warmup.
            tokio::time::sleep(Duration::from_secs(10)).await;
            cancel.cancel();
        });

        let outcome = sup
            .run_with_shutdown(&topology(&["S1"], &["K1"]), &launcher, token)
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Interrupted);
        for name in ["S1", "K1"] {
            assert!(launcher.state_of(name).lock().unwrap().terminated);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_before_start_leaves_nothing_running() {
        let launcher = FakeLauncher::new();
        let sup = Supervisor::new(fast_cfg(), vec![]);
        let token = CancellationToken::new();
        token.cancel();

        let outcome = sup
            .run_with_shutdown(&topology(&["S1"], &["K1"]), &launcher, token)
            .await
            .unwrap();

        // No child was ever requested from the launcher.
        assert_eq!(outcome, RunOutcome::Interrupted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_topology_rejected_before_spawning() {
        let launcher = FakeLauncher::new();
        let sup = Supervisor::new(fast_cfg(), vec![]);

        let err = sup
            .run_with_shutdown(
                &topology(&["S1"], &["S1"]),
                &launcher,
                CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.as_label(), "runtime_duplicate_node");
    }
}
