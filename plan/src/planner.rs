//! The planning facade tying the processors together.

use strata_core::{IdentifierProvider, InstanceId, Metadata, Payload};
use strata_graph::InstanceCollector;
use strata_model::{Model, ReferenceId};

use crate::error::PlanResult;
use crate::ops::{self, PlanContext};
use crate::statement::StatementSet;

/// Plans persistence statements against one model.
///
/// The planner is stateless between calls; the collector must read from the
/// same transactional snapshot the returned statements will execute in.
pub struct StatementPlanner<'a> {
    model: &'a Model,
    collector: &'a dyn InstanceCollector,
    ids: &'a dyn IdentifierProvider,
}

impl<'a> StatementPlanner<'a> {
    pub fn new(
        model: &'a Model,
        collector: &'a dyn InstanceCollector,
        ids: &'a dyn IdentifierProvider,
    ) -> Self {
        Self {
            model,
            collector,
            ids,
        }
    }

    fn context<'c>(&'c self, metadata: &'c Metadata) -> PlanContext<'c> {
        PlanContext {
            model: self.model,
            collector: self.collector,
            ids: self.ids,
            metadata,
        }
    }

    /// Plan the creation of a new instance tree.
    pub fn insert(
        &self,
        type_name: &str,
        payload: &Payload,
        metadata: &Metadata,
        check_mandatory: bool,
    ) -> PlanResult<StatementSet> {
        tracing::debug!(%type_name, "planning insert");
        ops::insert(&self.context(metadata), type_name, payload, check_mandatory)
    }

    /// Plan the mutation from `original` to `updated` for one instance.
    pub fn update(
        &self,
        type_name: &str,
        original: &Payload,
        updated: &Payload,
        metadata: &Metadata,
        check_mandatory: bool,
    ) -> PlanResult<StatementSet> {
        tracing::debug!(%type_name, "planning update");
        ops::update(
            &self.context(metadata),
            type_name,
            original,
            updated,
            check_mandatory,
        )
    }

    /// Plan the deletion of the given instances and their owned subtrees.
    pub fn delete(
        &self,
        type_name: &str,
        ids: &[InstanceId],
        metadata: &Metadata,
    ) -> PlanResult<StatementSet> {
        tracing::debug!(%type_name, count = ids.len(), "planning delete");
        ops::delete(&self.context(metadata), type_name, ids)
    }

    /// Plan the attachment of reference edges from `parent_id` to each of
    /// `identifiers`.
    ///
    /// `existence_check` marks the targets as persisted: each one gets an
    /// `InstanceExists` statement and, when the reference's opposite is
    /// single-valued, its current holders are read from the collector and
    /// surfaced as `already_referencing` for the executor's implicit detach.
    /// Pass `false` only for targets planned in the same batch; they have no
    /// snapshot to consult, so neither check is emitted.
    pub fn add_reference(
        &self,
        reference: ReferenceId,
        identifiers: &[InstanceId],
        parent_id: InstanceId,
        metadata: &Metadata,
        existence_check: bool,
    ) -> PlanResult<StatementSet> {
        ops::add_reference(
            &self.context(metadata),
            reference,
            identifiers,
            parent_id,
            existence_check,
        )
    }

    /// Plan the detachment of reference edges from `parent_id` to each of
    /// `identifiers`.
    pub fn remove_reference(
        &self,
        reference: ReferenceId,
        identifiers: &[InstanceId],
        parent_id: InstanceId,
        metadata: &Metadata,
        existence_check: bool,
    ) -> PlanResult<StatementSet> {
        ops::remove_reference(
            &self.context(metadata),
            reference,
            identifiers,
            parent_id,
            existence_check,
        )
    }
}
