//! # Logging subscriber.
//!
//! [`LogWriter`] renders every run lifecycle event through the [`log`]
//! facade, so supervisor lines interleave with whatever the node processes
//! write to the shared stdout/stderr. The `nodevisor` binary installs
//! `env_logger` behind the facade; embedders may install any `log` backend.
//!
//! ## Output format
//! ```text
//! [starting] node=Q1
//! [spawned] node=Q1 pid=4242
//! [services-started]
//! [client-finished] node=K1 code=0
//! [service-failed] node=P21 code=1
//! [shutdown-requested]
//! [stopping] group=clients
//! [stopped] node=Q1 code=-15
//! [all-stopped]
//! ```

use async_trait::async_trait;
use log::{error, info, warn};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Renders run lifecycle events as log lines.
///
/// One line per event, `[kind] key=value` style. Failures that end or degrade
/// the run (`SpawnFailed`, `ServiceFailed`) log at `error`/`warn`; everything
/// else at `info`.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let node = e.node.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::NodeStarting => info!("[starting] node={node}"),
            EventKind::NodeSpawned => match e.pid {
                Some(pid) => info!("[spawned] node={node} pid={pid}"),
                None => info!("[spawned] node={node}"),
            },
            EventKind::SpawnFailed => {
                error!(
                    "[spawn-failed] node={node} err={}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::ServicesStarted => info!("[services-started]"),
            EventKind::ClientsStarted => info!("[clients-started]"),
            EventKind::ClientFinished => {
                info!("[client-finished] node={node} code={}", code_of(e));
            }
            EventKind::ServiceFailed => {
                error!("[service-failed] node={node} code={}", code_of(e));
            }
            EventKind::ShutdownRequested => info!("[shutdown-requested]"),
            EventKind::GroupStopping => {
                info!("[stopping] group={}", e.group.as_deref().unwrap_or("?"));
            }
            EventKind::StopFailed => {
                warn!(
                    "[stop-failed] node={node} err={}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::NodeStopped => {
                info!("[stopped] node={node} code={}", code_of(e));
            }
            EventKind::AllStopped => info!("[all-stopped]"),
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

fn code_of(e: &Event) -> i32 {
    e.code.unwrap_or(-1)
}
