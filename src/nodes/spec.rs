//! # Node specification.
//!
//! Defines [`NodeSpec`] — the static description of one pipeline node: a
//! unique name and the program that executes it. Specs are immutable, defined
//! once at configuration time, and grouped into a
//! [`Topology`](crate::Topology).

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Static description of one node: name plus program.
///
/// The name identifies the process in logs, events, and monitor results, and
/// is passed to the program as its sole argument. Several nodes may share one
/// program (the name tells the instances apart).
///
/// ## Example
/// ```
/// use nodevisor::NodeSpec;
///
/// let spec = NodeSpec::new("P11", "/opt/pipeline/p1x-service");
/// assert_eq!(spec.name(), "P11");
/// ```
#[derive(Clone, Debug)]
pub struct NodeSpec {
    name: Arc<str>,
    program: PathBuf,
}

impl NodeSpec {
    /// Creates a new node specification.
    pub fn new(name: impl Into<Arc<str>>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
        }
    }

    /// Returns the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the program executed for this node.
    pub fn program(&self) -> &Path {
        &self.program
    }
}
