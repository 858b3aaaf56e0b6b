//! # Process handle: one launched node.
//!
//! [`NodeHandle`] pairs a node name with an owned child process and a cached
//! exit code. The child sits behind the [`ChildProc`] trait so tests can
//! substitute scripted fakes without touching process-creation code.
//!
//! ## Rules
//! - The exit code is `None` until a poll observes an exit; once set it is
//!   **never reset** (a process, once exited, is never reused).
//! - A handle whose exit is already recorded ignores terminate/kill requests:
//!   after the child is reaped its pid may be recycled, so signalling it
//!   again would target an unrelated process.
//! - Polling is non-blocking; the supervisor never waits on a single child.

use std::io;
use std::sync::Arc;

/// Minimal control surface of one child process.
///
/// Implemented by the real OS-backed child
/// ([`ProcessLauncher`](crate::ProcessLauncher)) and by test fakes. All
/// methods are non-blocking.
pub trait ChildProc: Send {
    /// Non-blocking status query: `Ok(Some(code))` once the process has
    /// exited, `Ok(None)` while it is still running.
    fn poll_exit(&mut self) -> io::Result<Option<i32>>;

    /// Requests graceful termination (SIGTERM on Unix).
    fn terminate(&mut self) -> io::Result<()>;

    /// Forcibly kills the process (SIGKILL on Unix).
    fn force_kill(&mut self) -> io::Result<()>;

    /// OS process id, while known.
    fn id(&self) -> Option<u32> {
        None
    }
}

/// One launched node: name, owned child process, cached exit code.
///
/// Exclusively owned by its group's handle list until shutdown; mutated only
/// by polling (which refreshes the cached exit code) and by termination
/// calls.
pub struct NodeHandle {
    name: Arc<str>,
    child: Box<dyn ChildProc>,
    exit: Option<i32>,
}

impl NodeHandle {
    /// Wraps a freshly spawned child.
    pub fn new(name: impl Into<Arc<str>>, child: Box<dyn ChildProc>) -> Self {
        Self {
            name: name.into(),
            child,
            exit: None,
        }
    }

    /// Returns the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node name as the shared string used in events.
    pub(crate) fn name_shared(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// OS process id, while the child is alive and real.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// The exit code recorded by an earlier poll, if any.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit
    }

    /// True once an exit has been observed.
    pub fn has_exited(&self) -> bool {
        self.exit.is_some()
    }

    /// Refreshes and returns the exit code (non-blocking).
    ///
    /// Once an exit has been recorded this returns the cached code without
    /// touching the child again. A transient status-query error is logged
    /// and treated as "still running" until the next poll.
    pub fn poll(&mut self) -> Option<i32> {
        if self.exit.is_some() {
            return self.exit;
        }
        match self.child.poll_exit() {
            Ok(Some(code)) => {
                self.exit = Some(code);
                self.exit
            }
            Ok(None) => None,
            Err(err) => {
                log::warn!("status poll for node {} failed: {err}", self.name);
                None
            }
        }
    }

    /// Requests graceful termination; a no-op once the exit is recorded.
    pub fn terminate(&mut self) -> io::Result<()> {
        if self.exit.is_some() {
            return Ok(());
        }
        self.child.terminate()
    }

    /// Forcibly kills the child; a no-op once the exit is recorded.
    pub fn force_kill(&mut self) -> io::Result<()> {
        if self.exit.is_some() {
            return Ok(());
        }
        self.child.force_kill()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeChild;

    #[test]
    fn test_exit_code_is_sticky() {
        let (child, _state) = FakeChild::exits_after(1, 7);
        let mut handle = NodeHandle::new("N", Box::new(child));

        assert_eq!(handle.exit_code(), None);
        assert_eq!(handle.poll(), Some(7));
        assert_eq!(handle.poll(), Some(7));
        assert!(handle.has_exited());
    }

    #[test]
    fn test_terminate_skipped_after_exit_observed() {
        let (child, state) = FakeChild::exits_after(1, 0);
        let mut handle = NodeHandle::new("N", Box::new(child));

        assert_eq!(handle.poll(), Some(0));
        handle.terminate().unwrap();
        handle.force_kill().unwrap();

        let s = state.lock().unwrap();
        assert!(!s.terminated);
        assert!(!s.killed);
    }

    #[test]
    fn test_running_child_polls_none() {
        let (child, _state) = FakeChild::running();
        let mut handle = NodeHandle::new("N", Box::new(child));

        assert_eq!(handle.poll(), None);
        assert!(!handle.has_exited());
    }
}
