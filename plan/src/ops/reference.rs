//! ADD/REMOVE-REFERENCE processors - plan reference-edge mutations.

use strata_core::InstanceId;
use strata_model::ReferenceId;
use std::collections::BTreeSet;

use crate::error::{PlanError, PlanResult};
use crate::ops::PlanContext;
use crate::statement::{Statement, StatementSet};

/// Plan the attachment of reference edges from `parent_id` to each of
/// `identifiers`.
///
/// When the reference's opposite is single-valued, the current holders of
/// that opposite are surfaced on the statement as `already_referencing`; the
/// executing layer performs the implicit detach-and-reattach in one step so
/// the detach never races the add.
pub fn add_reference(
    ctx: &PlanContext<'_>,
    reference: ReferenceId,
    identifiers: &[InstanceId],
    parent_id: InstanceId,
    existence_check: bool,
) -> PlanResult<StatementSet> {
    let def = ctx
        .model
        .reference(reference)
        .ok_or_else(|| PlanError::invalid_argument(format!("unknown reference {reference}")))?;
    let single_opposite = ctx
        .model
        .opposite_of(reference)
        .is_some_and(|opposite| opposite.is_single());

    let mut out = StatementSet::new();
    for id in identifiers {
        if existence_check {
            out.insert(Statement::InstanceExists {
                entity_type: def.target,
                id: *id,
            });
        }
        // Only a persisted target can already be referenced; freshly planned
        // instances have no snapshot to consult.
        let already_referencing = if single_opposite && existence_check {
            let graph = ctx.collector.collect_graph(def.target, *id)?;
            let holders: BTreeSet<InstanceId> = graph
                .back_references_via(reference)
                .filter(|holder| *holder != parent_id)
                .collect();
            (!holders.is_empty()).then_some(holders)
        } else {
            None
        };
        out.insert(Statement::AddReference {
            entity_type: def.source,
            reference,
            id: parent_id,
            referenced_id: *id,
            already_referencing,
        });
    }
    Ok(out)
}

/// Plan the detachment of reference edges from `parent_id` to each of
/// `identifiers`.
pub fn remove_reference(
    ctx: &PlanContext<'_>,
    reference: ReferenceId,
    identifiers: &[InstanceId],
    parent_id: InstanceId,
    existence_check: bool,
) -> PlanResult<StatementSet> {
    let def = ctx
        .model
        .reference(reference)
        .ok_or_else(|| PlanError::invalid_argument(format!("unknown reference {reference}")))?;

    let mut out = StatementSet::new();
    for id in identifiers {
        if existence_check {
            out.insert(Statement::InstanceExists {
                entity_type: def.target,
                id: *id,
            });
        }
        out.insert(Statement::RemoveReference {
            entity_type: def.source,
            reference,
            id: parent_id,
            referenced_id: *id,
        });
    }
    Ok(out)
}
