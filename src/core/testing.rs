//! Scripted fakes for exercising the supervision logic without real
//! processes: a [`FakeChild`] whose exit behavior is planned per test, and a
//! [`FakeLauncher`] binding node names to those children.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::handle::{ChildProc, NodeHandle};
use crate::core::launcher::Launch;
use crate::error::SpawnError;
use crate::nodes::NodeSpec;

/// Observable state of one fake child, shared with the test.
#[derive(Default)]
pub(crate) struct FakeState {
    /// Number of status polls the child has seen while alive.
    pub polls: u32,
    /// Number of terminate requests delivered.
    pub terminations: u32,
    /// A terminate request was delivered.
    pub terminated: bool,
    /// A kill request was delivered.
    pub killed: bool,
    /// The exit code reported to the poller, once dead.
    pub exit_code: Option<i32>,

    exits_after: Option<u32>,
    planned_code: i32,
    honors_terminate: bool,
    stop_errors: bool,
}

/// A child process with scripted behavior.
///
/// Exit codes mirror the real launcher's convention: `-15` when a honored
/// terminate ends the child, `-9` after a kill.
pub(crate) struct FakeChild {
    state: Arc<Mutex<FakeState>>,
}

impl FakeChild {
    fn with_state(state: FakeState) -> (Self, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(state));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }

    /// Runs until terminated or killed; honors terminate.
    pub fn running() -> (Self, Arc<Mutex<FakeState>>) {
        Self::with_state(FakeState {
            honors_terminate: true,
            ..FakeState::default()
        })
    }

    /// Exits on its own with `code` at the `polls`-th status poll.
    pub fn exits_after(polls: u32, code: i32) -> (Self, Arc<Mutex<FakeState>>) {
        Self::with_state(FakeState {
            exits_after: Some(polls),
            planned_code: code,
            honors_terminate: true,
            ..FakeState::default()
        })
    }

    /// Ignores terminate; only dies when killed.
    pub fn stubborn() -> (Self, Arc<Mutex<FakeState>>) {
        Self::with_state(FakeState::default())
    }

    /// Both stop calls fail, as for a process that is already gone.
    pub fn unstoppable() -> (Self, Arc<Mutex<FakeState>>) {
        Self::with_state(FakeState {
            stop_errors: true,
            ..FakeState::default()
        })
    }
}

impl ChildProc for FakeChild {
    fn poll_exit(&mut self) -> io::Result<Option<i32>> {
        let mut s = self.state.lock().unwrap();
        if let Some(code) = s.exit_code {
            return Ok(Some(code));
        }
        if s.terminated && s.honors_terminate {
            s.exit_code = Some(-15);
            return Ok(s.exit_code);
        }
        if s.killed {
            s.exit_code = Some(-9);
            return Ok(s.exit_code);
        }
        s.polls += 1;
        if let Some(n) = s.exits_after {
            if s.polls >= n {
                s.exit_code = Some(s.planned_code);
                return Ok(s.exit_code);
            }
        }
        Ok(None)
    }

    fn terminate(&mut self) -> io::Result<()> {
        let mut s = self.state.lock().unwrap();
        if s.stop_errors {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such process"));
        }
        s.terminated = true;
        s.terminations += 1;
        Ok(())
    }

    fn force_kill(&mut self) -> io::Result<()> {
        let mut s = self.state.lock().unwrap();
        if s.stop_errors {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such process"));
        }
        s.killed = true;
        Ok(())
    }
}

/// A launcher with a per-name plan: scripted children and injected spawn
/// failures.
#[derive(Default)]
pub(crate) struct FakeLauncher {
    children: Mutex<HashMap<String, FakeChild>>,
    failures: HashSet<String>,
    states: Mutex<HashMap<String, Arc<Mutex<FakeState>>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans a specific child for `name`.
    pub fn with_child(self, name: &str, child: FakeChild, state: Arc<Mutex<FakeState>>) -> Self {
        self.children.lock().unwrap().insert(name.to_string(), child);
        self.states.lock().unwrap().insert(name.to_string(), state);
        self
    }

    /// Plans a plain running child for each of `names`.
    pub fn with_running(self, names: &[&str]) -> Self {
        let mut this = self;
        for name in names {
            let (child, state) = FakeChild::running();
            this = this.with_child(name, child, state);
        }
        this
    }

    /// Makes `name` fail to spawn.
    pub fn with_failure(mut self, name: &str) -> Self {
        self.failures.insert(name.to_string());
        self
    }

    /// Shared state of the child planned for `name`.
    pub fn state_of(&self, name: &str) -> Arc<Mutex<FakeState>> {
        Arc::clone(&self.states.lock().unwrap()[name])
    }
}

#[async_trait]
impl Launch for FakeLauncher {
    async fn launch(&self, spec: &NodeSpec) -> Result<NodeHandle, SpawnError> {
        if self.failures.contains(spec.name()) {
            return Err(SpawnError {
                node: spec.name().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
            });
        }
        let child = self
            .children
            .lock()
            .unwrap()
            .remove(spec.name())
            .unwrap_or_else(|| panic!("no child planned for node {}", spec.name()));
        Ok(NodeHandle::new(spec.name(), Box::new(child)))
    }
}
