//! Statement processor implementations.
//!
//! Each processor (insert, update, delete, add/remove-reference) is
//! implemented in its own module for better organization and testability.

mod delete;
mod insert;
mod reference;
mod update;

pub(crate) use delete::delete;
pub(crate) use insert::insert;
pub(crate) use reference::{add_reference, remove_reference};
pub(crate) use update::update;

use strata_core::{IdentifierProvider, Metadata};
use strata_graph::InstanceCollector;
use strata_model::Model;

/// Everything a processor needs for one planner call.
pub(crate) struct PlanContext<'a> {
    pub model: &'a Model,
    pub collector: &'a dyn InstanceCollector,
    pub ids: &'a dyn IdentifierProvider,
    pub metadata: &'a Metadata,
}
