//! # Pipeline topology: the two ordered node groups.
//!
//! [`Topology`] is the whole static configuration of a run: the ordered
//! *service* group and the ordered *client* group. Order within a group is
//! meaningful — it encodes the dependency chain (intake/distribution →
//! tier-1 services → intermediate queues → tier-2 services), and nodes are
//! launched strictly in that order.
//!
//! ## Rules
//! - Node names must be unique across the **whole** topology, both groups.
//! - Services are started (and fully spawned) before any client starts.
//! - A service's unexpected exit is fatal for the run; a client's exit is
//!   expected and counts toward completion.

use std::collections::HashSet;

use crate::error::RuntimeError;
use crate::nodes::NodeSpec;

/// The static node configuration for one run.
///
/// Built once and passed to [`Supervisor::run`](crate::Supervisor::run) —
/// no ambient state, so tests can substitute arbitrary topologies bound to
/// fake launchers.
///
/// ## Example
/// ```
/// use nodevisor::{NodeSpec, Topology};
///
/// let topology = Topology::new(
///     vec![
///         NodeSpec::new("Q1", "./q1-node"),
///         NodeSpec::new("P11", "./p1x-service"),
///     ],
///     vec![NodeSpec::new("K1", "./client")],
/// );
/// assert!(topology.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct Topology {
    /// Ordered service group; an early exit of any of these ends the run.
    pub services: Vec<NodeSpec>,
    /// Ordered client group; the run completes when all of these exit.
    pub clients: Vec<NodeSpec>,
}

impl Topology {
    /// Creates a topology from the two ordered groups.
    pub fn new(services: Vec<NodeSpec>, clients: Vec<NodeSpec>) -> Self {
        Self { services, clients }
    }

    /// Checks that node names are unique across both groups.
    ///
    /// Names identify processes in logs, events, and monitor results, so a
    /// repeated name would make those ambiguous.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        let mut seen = HashSet::new();
        for spec in self.services.iter().chain(self.clients.iter()) {
            if !seen.insert(spec.name()) {
                return Err(RuntimeError::DuplicateNode {
                    name: spec.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Total number of nodes across both groups.
    pub fn len(&self) -> usize {
        self.services.len() + self.clients.len()
    }

    /// True if the topology declares no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> NodeSpec {
        NodeSpec::new(name, "/bin/true")
    }

    #[test]
    fn test_unique_names_pass_validation() {
        let topo = Topology::new(vec![spec("Q1"), spec("D")], vec![spec("K1"), spec("K2")]);
        assert!(topo.validate().is_ok());
        assert_eq!(topo.len(), 4);
    }

    #[test]
    fn test_duplicate_within_group_rejected() {
        let topo = Topology::new(vec![spec("Q1"), spec("Q1")], vec![]);
        let err = topo.validate().unwrap_err();
        assert_eq!(err.as_label(), "runtime_duplicate_node");
    }

    #[test]
    fn test_duplicate_across_groups_rejected() {
        let topo = Topology::new(vec![spec("Q1")], vec![spec("Q1")]);
        assert!(matches!(
            topo.validate(),
            Err(RuntimeError::DuplicateNode { name }) if name == "Q1"
        ));
    }

    #[test]
    fn test_empty_topology_is_valid() {
        let topo = Topology::new(vec![], vec![]);
        assert!(topo.validate().is_ok());
        assert!(topo.is_empty());
    }
}
