//! # nodevisor
//!
//! **Nodevisor** supervises a fixed pipeline of independently-executing
//! worker processes: queue/distribution nodes, two tiers of service nodes,
//! and client drivers. It launches nodes in a prescribed order, detects
//! early failure of critical nodes, detects completion of all client nodes,
//! and performs an orderly two-phase shutdown of every launched process
//! regardless of how the run ends.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐        ┌──────────────┐
//!     │   NodeSpec   │   │   NodeSpec   │  ...   │   NodeSpec   │
//!     └──────┬───────┘   └──────┬───────┘        └──────┬───────┘
//!            └────────────┬─────┴───────────────────────┘
//!                         ▼
//!              Topology { services, clients }
//!                         │
//! ┌───────────────────────▼───────────────────────────────────────────┐
//! │  Supervisor (one run)                                             │
//! │  - start_group(services)  ── stagger between starts               │
//! │  - warm-up pause          ── stand-in for readiness               │
//! │  - start_group(clients)                                           │
//! │  - wait_for_completion()  ── poll loop, services first            │
//! │  - stop_group(clients) → stop_group(services)  ── always runs     │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!   ┌──────────┐      ┌──────────┐       ┌──────────┐          │ Events
//!   │ process  │      │ process  │  ...  │ process  │          ▼
//!   │  (Q1)    │      │  (P11)   │       │  (K1)    │   Bus ─► SubscriberSet
//!   └──────────┘      └──────────┘       └──────────┘    ─► LogWriter, custom
//! ```
//!
//! ## Lifecycle
//! ```text
//! INIT → STARTING_SERVICES → WARMUP → STARTING_CLIENTS → MONITORING
//!      → SHUTTING_DOWN → STOPPED
//! ```
//! Every path — all clients finishing, a service failing, a spawn failure
//! during either start phase, or an interrupt at any point — transitions to
//! `SHUTTING_DOWN`, which stops clients first, then services, with whatever
//! subset of handles exists at that moment.
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits              |
//! |-----------------|----------------------------------------------------------|---------------------------------|
//! | **Topology**    | Static node configuration: two ordered groups.           | [`NodeSpec`], [`Topology`]      |
//! | **Launching**   | One OS process per node; seam for test fakes.            | [`Launch`], [`ProcessLauncher`] |
//! | **Handles**     | Non-blocking poll, graceful terminate, forced kill.      | [`NodeHandle`], [`ChildProc`]   |
//! | **Supervision** | Staggered startup, health polling, two-phase shutdown.   | [`Supervisor`], [`RunOutcome`]  |
//! | **Events**      | Lifecycle events fanned out to subscribers.              | [`Event`], [`Bus`], [`Subscribe`] |
//! | **Errors**      | Typed spawn/runtime failures.                            | [`SpawnError`], [`RuntimeError`] |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use nodevisor::{
//!     Config, LogWriter, NodeSpec, ProcessLauncher, RunOutcome, Subscribe, Supervisor,
//!     Topology,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.warmup = Duration::from_secs(1);
//!
//!     let topology = Topology::new(
//!         vec![
//!             NodeSpec::new("Q1", "./q1-node"),
//!             NodeSpec::new("P11", "./p1x-service"),
//!         ],
//!         vec![NodeSpec::new("K1", "./client")],
//!     );
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
//!     let sup = Supervisor::new(cfg, subs);
//!
//!     match sup.run(&topology, &ProcessLauncher).await? {
//!         RunOutcome::ClientsFinished => println!("pipeline done"),
//!         RunOutcome::ServiceFailed { node, code } => {
//!             eprintln!("service {node} exited early with code {code}");
//!         }
//!         RunOutcome::Interrupted => println!("interrupted"),
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod nodes;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{ChildProc, Launch, NodeHandle, ProcessLauncher, RunOutcome, Supervisor};
pub use error::{RuntimeError, SpawnError};
pub use events::{Bus, Event, EventKind};
pub use nodes::{NodeSpec, Topology};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
