//! DELETE processor - plan the removal of an instance and its closure.

use strata_core::InstanceId;
use strata_graph::{CollectError, InstanceGraph};
use strata_model::{ReferenceDef, ReferenceId};

use crate::error::{PlanError, PlanResult};
use crate::ops::{reference, PlanContext};
use crate::statement::{Statement, StatementSet};

/// Plan the deletion of the given instances, their owned subtrees, every edge
/// touching a subtree, and any holders annotated to die with their target.
pub fn delete(
    ctx: &PlanContext<'_>,
    type_name: &str,
    ids: &[InstanceId],
) -> PlanResult<StatementSet> {
    let entity_type = ctx
        .model
        .mapped_entity_type_of(type_name)
        .ok_or_else(|| PlanError::unmapped_type(type_name))?;
    let mut graphs = ctx.collector.collect_graphs(entity_type, ids)?;
    let mut out = StatementSet::new();
    for id in ids {
        if out.contains_delete(entity_type, *id) {
            continue;
        }
        let graph = graphs
            .remove(id)
            .ok_or(CollectError::InstanceNotFound {
                entity_type,
                id: *id,
            })?;
        collect(ctx, &graph, true, &mut out)?;
    }
    Ok(out)
}

fn ref_def<'a>(ctx: &PlanContext<'a>, id: ReferenceId) -> PlanResult<&'a ReferenceDef> {
    ctx.model
        .reference(id)
        .ok_or_else(|| PlanError::invalid_argument(format!("snapshot carries unknown reference {id}")))
}

/// Recursive collection for one snapshot. `detach_container` is set when the
/// instance's containment parent survives the plan and the owning edge must
/// be removed explicitly.
pub(crate) fn collect(
    ctx: &PlanContext<'_>,
    graph: &InstanceGraph,
    detach_container: bool,
    out: &mut StatementSet,
) -> PlanResult<()> {
    if out.contains_delete(graph.entity_type, graph.id) {
        tracing::debug!(id = %graph.id, "delete cycle closed, instance already planned");
        return Ok(());
    }
    out.insert(Statement::Delete {
        id: graph.id,
        entity_type: graph.entity_type,
    });

    if detach_container {
        for (r, holder) in &graph.back_references {
            let def = ref_def(ctx, *r)?;
            if def.containment {
                out.insert(Statement::InstanceExists {
                    entity_type: def.source,
                    id: *holder,
                });
                out.extend(reference::remove_reference(ctx, *r, &[graph.id], *holder, true)?);
            }
        }
    }

    // Holders annotated with cascade-delete die with their target. Queue
    // them before auditing so mutual references do not trip the audit.
    for (r, holder) in &graph.back_references {
        let def = ref_def(ctx, *r)?;
        if def.containment || !def.cascade_delete {
            continue;
        }
        if out.contains_delete(def.source, *holder) {
            continue;
        }
        let holder_graph = ctx.collector.collect_graph(def.source, *holder)?;
        collect(ctx, &holder_graph, true, out)?;
    }

    // Whatever still points here either tolerates losing the edge or the
    // whole plan is rejected.
    for (r, holder) in &graph.back_references {
        let def = ref_def(ctx, *r)?;
        if def.containment || def.cascade_delete || out.contains_delete(def.source, *holder) {
            continue;
        }
        if def.is_mandatory() {
            return Err(PlanError::dangling_mandatory(
                ctx.model.type_name(def.source),
                *holder,
                &def.name,
            ));
        }
        out.extend(reference::remove_reference(ctx, *r, &[graph.id], *holder, false)?);
    }

    for (r, target) in &graph.references {
        let def = ref_def(ctx, *r)?;
        // The edge up to the containment parent is the container detach,
        // already handled from the parent's side.
        if ctx.model.opposite_of(*r).is_some_and(|o| o.containment) {
            continue;
        }
        // Both ends of the detached edge are checked before execution.
        out.insert(Statement::InstanceExists {
            entity_type: graph.entity_type,
            id: graph.id,
        });
        out.extend(reference::remove_reference(ctx, *r, &[*target], graph.id, true)?);
        if ctx.model.is_cascade_delete_on_opposite(*r) && !out.contains_delete(def.target, *target)
        {
            let target_graph = ctx.collector.collect_graph(def.target, *target)?;
            collect(ctx, &target_graph, true, out)?;
        }
    }

    // Owned children go last; their container dies with them, so no detach.
    for (_, child) in &graph.containments {
        collect(ctx, child, false, out)?;
    }

    Ok(())
}
