//! Strata Metamodel
//!
//! Entity types, attributes and references with cardinality, containment,
//! opposite and cascade-delete information, plus the mapping from transfer
//! (view) types to their backing entity types.
//!
//! The metamodel is compiled once through [`ModelBuilder`] into an immutable
//! [`Model`]; the planner only ever reads it.

mod builder;
mod model;
mod types;

pub use builder::{ModelBuilder, ModelError, ReferenceBuilder, TypeBuilder};
pub use model::Model;
pub use types::*;
