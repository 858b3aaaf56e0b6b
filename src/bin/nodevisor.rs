//! Supervisor binary for the reference pipeline.
//!
//! Wires the supervision engine to the fixed topology of the distributed
//! pipeline: intake/distribution nodes, tier-1 services, intermediate
//! queues, tier-2 services, and the client drivers. Node programs are
//! resolved under `--nodes-dir` and receive their node name as the sole
//! argument; their output interleaves with the supervisor's log lines.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};

use nodevisor::{
    Config, LogWriter, NodeSpec, ProcessLauncher, RunOutcome, Subscribe, Supervisor, Topology,
};

/// Queue, distribution, and service nodes, in launch order.
const SERVICE_NODES: &[(&str, &str)] = &[
    // Queue and distribution nodes
    ("Q1", "q1-node"),
    ("D", "d-node"),
    // Tier-1 service nodes
    ("P11", "p1x-service"),
    ("P12", "p1x-service"),
    ("P13", "p1x-service"),
    // Intermediate queue nodes
    ("Q21", "q2x-node"),
    ("Q22", "q2x-node"),
    ("Q23", "q2x-node"),
    // Tier-2 service nodes
    ("P21", "p2x-service"),
    ("P22", "p2x-service"),
    ("P23", "p2x-service"),
];

/// Client drivers; the run completes when all of them exit.
const CLIENT_NODES: &[(&str, &str)] = &[("K1", "client"), ("K2", "client")];

/// Supervises the pipeline: staggered startup, health polling, and orderly
/// two-phase shutdown of every node.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing the node programs
    #[arg(short, long, default_value = ".")]
    nodes_dir: PathBuf,

    /// Delay between consecutive node starts
    #[arg(long, default_value = "500ms", value_parser = humantime::parse_duration)]
    stagger: Duration,

    /// Warm-up pause between service and client startup (there is no
    /// readiness handshake; tune this to the slowest service)
    #[arg(long, default_value = "3s", value_parser = humantime::parse_duration)]
    warmup: Duration,

    /// Period between health checks
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    poll_interval: Duration,

    /// Time allowed for graceful exit before force-killing
    #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
    grace: Duration,
}

fn pipeline_topology(nodes_dir: &Path) -> Topology {
    let spec = |(name, program): &(&str, &str)| NodeSpec::new(*name, nodes_dir.join(program));
    Topology::new(
        SERVICE_NODES.iter().map(spec).collect(),
        CLIENT_NODES.iter().map(spec).collect(),
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    // Default filter level "info" so node lifecycle lines show up out of
    // the box.
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cfg = Config {
        stagger: args.stagger,
        warmup: args.warmup,
        poll_interval: args.poll_interval,
        grace: args.grace,
        ..Config::default()
    };
    let topology = pipeline_topology(&args.nodes_dir);

    info!(
        "starting pipeline: {} services, {} clients from {}",
        topology.services.len(),
        topology.clients.len(),
        args.nodes_dir.display()
    );

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
    let sup = Supervisor::new(cfg, subs);

    // Any completed run exits 0 — shutdown ran over both groups. Only an
    // error escaping the sequence (spawn failure, bad topology) is fatal.
    match sup.run(&topology, &ProcessLauncher).await? {
        RunOutcome::ClientsFinished => info!("all clients finished"),
        RunOutcome::ServiceFailed { node, code } => {
            warn!("service {node} exited early with code {code}; run was cut short");
        }
        RunOutcome::Interrupted => info!("shutdown requested; run ended early"),
    }
    Ok(())
}
