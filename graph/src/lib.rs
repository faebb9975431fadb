//! Strata Instance Graph
//!
//! The read-only snapshot of one persisted instance's neighborhood
//! (containments, forward references, back-references) and the
//! [`InstanceCollector`] trait through which the storage layer produces it.
//!
//! The planner only ever reads instance graphs; it describes the deltas it
//! wants applied through statements, never by mutating a snapshot.

mod collector;
mod graph;

pub use collector::*;
pub use graph::*;
