//! Static node configuration.
//!
//! - [`NodeSpec`] — one node: unique name plus the program that runs it.
//! - [`Topology`] — the ordered service and client groups for a run.

mod spec;
mod topology;

pub use spec::NodeSpec;
pub use topology::Topology;
