//! # Process launcher: one OS process per node.
//!
//! The [`Launch`] trait is the seam between the supervision logic and
//! process creation: the runtime only ever sees [`NodeHandle`]s, so tests
//! bind fake launchers to fake node lists without touching this module.
//!
//! [`ProcessLauncher`] is the real implementation. It spawns the node's
//! program as an independent OS process with the node's name as its sole
//! argument, leaving stdin/stdout/stderr attached to the supervisor's own
//! streams so node logs interleave with supervisor logs.
//!
//! ## Exit-code convention
//! A child that exits normally reports its exit status; a child terminated
//! by signal *n* reports `-n`; an unknown status reports `-1`.

use std::io;
use std::process::ExitStatus;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::core::handle::{ChildProc, NodeHandle};
use crate::error::SpawnError;
use crate::nodes::NodeSpec;

/// Spawns one process for one node.
///
/// Object safe so the supervisor can take `&dyn Launch`; implement it to
/// substitute scripted children in tests or to wrap process creation (e.g.
/// containers) in embedders.
#[async_trait]
pub trait Launch: Send + Sync {
    /// Starts the node's program, returning the handle to poll and stop it.
    ///
    /// Fails with [`SpawnError`] if the program cannot be found or executed;
    /// the failure aborts the startup sequence of the surrounding group.
    async fn launch(&self, spec: &NodeSpec) -> Result<NodeHandle, SpawnError>;
}

/// The real launcher: `tokio::process::Command` with inherited stdio.
pub struct ProcessLauncher;

#[async_trait]
impl Launch for ProcessLauncher {
    async fn launch(&self, spec: &NodeSpec) -> Result<NodeHandle, SpawnError> {
        // Stdio is inherited by default: node output interleaves with the
        // supervisor's own log lines.
        let child = Command::new(spec.program())
            .arg(spec.name())
            .spawn()
            .map_err(|source| SpawnError {
                node: spec.name().to_string(),
                source,
            })?;

        Ok(NodeHandle::new(spec.name(), Box::new(OsChild { child })))
    }
}

/// OS-backed child process behind the [`ChildProc`] seam.
struct OsChild {
    child: Child,
}

impl ChildProc for OsChild {
    fn poll_exit(&mut self) -> io::Result<Option<i32>> {
        match self.child.try_wait()? {
            Some(status) => Ok(Some(exit_code_of(status))),
            None => Ok(None),
        }
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> io::Result<()> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // id() is None once the child has been reaped: nothing to signal.
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
            .map_err(|errno| io::Error::from_raw_os_error(errno as i32))
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> io::Result<()> {
        // No graceful signal on this platform; fall through to a hard kill.
        self.force_kill()
    }

    fn force_kill(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

/// Maps an [`ExitStatus`] to the crate's `i32` exit-code convention.
#[cfg(unix)]
fn exit_code_of(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|sig| -sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
