//! UPDATE processor - diff the original payload against the desired state.

use strata_core::{InstanceId, Payload, Value};
use strata_graph::InstanceGraph;
use strata_model::{EntityTypeId, ReferenceDef, ReferenceId};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{PlanError, PlanResult};
use crate::ops::{delete, insert, reference, PlanContext};
use crate::statement::{Statement, StatementSet};
use crate::validation;

/// Plan the mutation bringing the persisted state of one instance from
/// `original` to `updated`. Both payloads must identify the same instance;
/// unchanged features plan nothing.
pub fn update(
    ctx: &PlanContext<'_>,
    type_name: &str,
    original: &Payload,
    updated: &Payload,
    check_mandatory: bool,
) -> PlanResult<StatementSet> {
    let id = match (original.id(), updated.id()) {
        (Some(a), Some(b)) if a == b => a,
        (Some(_), Some(_)) => {
            return Err(PlanError::invalid_argument(
                "original and updated payloads identify different instances",
            ))
        }
        _ => {
            return Err(PlanError::invalid_argument(
                "update requires an identifier on both payloads",
            ))
        }
    };
    // Polymorphic payloads name their concrete type themselves.
    let concrete = updated.type_override().unwrap_or(type_name);
    let entity_type = ctx
        .model
        .mapped_entity_type_of(concrete)
        .ok_or_else(|| PlanError::unmapped_type(concrete))?;
    let graph = ctx.collector.collect_graph(entity_type, id)?;

    let mut out = StatementSet::new();
    collect(
        ctx,
        entity_type,
        id,
        original,
        updated,
        &graph,
        None,
        check_mandatory,
        &mut out,
    )?;
    Ok(out)
}

/// Recursive diff for one payload node.
#[allow(clippy::too_many_arguments)]
fn collect(
    ctx: &PlanContext<'_>,
    entity_type: EntityTypeId,
    id: InstanceId,
    original: &Payload,
    updated: &Payload,
    graph: &InstanceGraph,
    parent_reference: Option<ReferenceId>,
    check_mandatory: bool,
    out: &mut StatementSet,
) -> PlanResult<()> {
    let type_name = ctx.model.type_name(entity_type);

    if let (Some(expected), Some(actual)) = (original.version(), updated.version()) {
        if expected != actual {
            return Err(PlanError::optimistic_lock(type_name, id, expected, actual));
        }
    }

    if check_mandatory {
        validation::check_mandatory_attributes(ctx.model, entity_type, updated)?;
        validation::check_mandatory_references(ctx.model, entity_type, updated, parent_reference)?;
    }

    // An attribute changes only when the desired value differs from the
    // prior one; keys absent from `updated` leave the stored value alone.
    let mut changed = BTreeMap::new();
    for attr in ctx.model.attributes_of(entity_type) {
        if !attr.changeable || !updated.contains(&attr.name) {
            continue;
        }
        let desired = validation::attr_scalar(type_name, &attr.name, updated)?;
        let prior = validation::attr_scalar(type_name, &attr.name, original)?;
        if desired != prior {
            changed.insert(attr.name.clone(), desired.cloned().unwrap_or(Value::Null));
        }
    }
    if !changed.is_empty() {
        out.insert(Statement::InstanceExists { entity_type, id });
        out.insert(Statement::Update {
            id,
            entity_type,
            version: updated.version(),
            attributes: changed,
            user_id: ctx.metadata.user_id.clone(),
            username: ctx.metadata.username.clone(),
            timestamp: ctx.metadata.timestamp,
        });
    }

    for def in ctx.model.references_of(entity_type) {
        if !def.changeable || Some(def.id) == parent_reference || !updated.contains(&def.name) {
            continue;
        }
        if def.is_single() {
            let prior = validation::single_entry(type_name, &def.name, original)?;
            let desired = validation::single_entry(type_name, &def.name, updated)?;
            merge_single(ctx, def, id, graph, prior, desired, check_mandatory, out)?;
        } else {
            let prior =
                validation::list_entries(type_name, &def.name, original)?.unwrap_or_default();
            let desired =
                validation::list_entries(type_name, &def.name, updated)?.unwrap_or_default();
            merge_collection(ctx, def, id, graph, &prior, &desired, check_mandatory, out)?;
        }
    }

    Ok(())
}

/// Classify a single-valued reference change by its (prior id, desired id)
/// pair and plan accordingly.
#[allow(clippy::too_many_arguments)]
fn merge_single(
    ctx: &PlanContext<'_>,
    def: &ReferenceDef,
    parent_id: InstanceId,
    graph: &InstanceGraph,
    prior: Option<&Payload>,
    desired: Option<&Payload>,
    check_mandatory: bool,
    out: &mut StatementSet,
) -> PlanResult<()> {
    let prior_id = prior.and_then(Payload::id);
    let desired_id = desired.and_then(Payload::id);
    match (prior_id, desired_id) {
        // Nothing existed; a present entry is a brand-new embedded child.
        (None, None) => {
            if let Some(entry) = desired {
                embed_new(ctx, def, parent_id, entry, check_mandatory, out)?;
            }
        }
        // A pre-existing instance is linked in for the first time.
        (None, Some(new)) => link_existing(ctx, def, parent_id, new, out)?,
        // The prior child/link goes; leftover attributes spawn a
        // replacement.
        (Some(old), None) => {
            remove_old(ctx, def, parent_id, old, graph, out)?;
            if let Some(entry) = desired {
                if !entry.is_empty() {
                    embed_new(ctx, def, parent_id, entry, check_mandatory, out)?;
                }
            }
        }
        // Same instance on both sides; owned children are diffed in place,
        // an unchanged association link carries no meaning.
        (Some(old), Some(new)) if old == new => {
            if def.containment {
                let child = child_graph(ctx, graph, def, new)?;
                let empty = Payload::new();
                collect(
                    ctx,
                    def.target,
                    new,
                    prior.unwrap_or(&empty),
                    desired.unwrap_or(&empty),
                    &child,
                    ctx.model.opposite_of(def.id).map(|o| o.id),
                    check_mandatory,
                    out,
                )?;
            }
        }
        // The link moves to another instance.
        (Some(old), Some(new)) => {
            if def.containment {
                return Err(PlanError::illegal_shape(
                    ctx.model.type_name(def.source),
                    &def.name,
                    "the identity of an owned child cannot be changed",
                ));
            }
            out.extend(reference::remove_reference(ctx, def.id, &[old], parent_id, false)?);
            link_existing(ctx, def, parent_id, new, out)?;
        }
    }
    Ok(())
}

/// Apply the single-valued merge cases per element after partitioning both
/// collections by identifier.
#[allow(clippy::too_many_arguments)]
fn merge_collection(
    ctx: &PlanContext<'_>,
    def: &ReferenceDef,
    parent_id: InstanceId,
    graph: &InstanceGraph,
    prior: &[&Payload],
    desired: &[&Payload],
    check_mandatory: bool,
    out: &mut StatementSet,
) -> PlanResult<()> {
    let prior_by_id: BTreeMap<InstanceId, &Payload> = prior
        .iter()
        .filter_map(|entry| entry.id().map(|id| (id, *entry)))
        .collect();

    let mut kept = BTreeSet::new();
    for entry in desired {
        match entry.id() {
            None => embed_new(ctx, def, parent_id, entry, check_mandatory, out)?,
            Some(id) => {
                kept.insert(id);
                match prior_by_id.get(&id) {
                    Some(prior_entry) if def.containment => {
                        let child = child_graph(ctx, graph, def, id)?;
                        collect(
                            ctx,
                            def.target,
                            id,
                            prior_entry,
                            entry,
                            &child,
                            ctx.model.opposite_of(def.id).map(|o| o.id),
                            check_mandatory,
                            out,
                        )?;
                    }
                    Some(_) => {}
                    None => link_existing(ctx, def, parent_id, id, out)?,
                }
            }
        }
    }

    for old in prior_by_id.keys() {
        if !kept.contains(old) {
            remove_old(ctx, def, parent_id, *old, graph, out)?;
        }
    }
    Ok(())
}

/// Plan a brand-new embedded child under `parent_id`. Only owned children
/// may be embedded; association entries must name an existing instance.
fn embed_new(
    ctx: &PlanContext<'_>,
    def: &ReferenceDef,
    parent_id: InstanceId,
    entry: &Payload,
    check_mandatory: bool,
    out: &mut StatementSet,
) -> PlanResult<()> {
    if !def.containment {
        return Err(PlanError::illegal_shape(
            ctx.model.type_name(def.source),
            &def.name,
            "association entries must carry an identifier",
        ));
    }
    let child = insert::collect(ctx, def.target, entry, Some(def.id), check_mandatory, out)?;
    out.extend(reference::add_reference(ctx, def.id, &[child], parent_id, false)?);
    Ok(())
}

/// Plan the checked attachment of a pre-existing instance.
fn link_existing(
    ctx: &PlanContext<'_>,
    def: &ReferenceDef,
    parent_id: InstanceId,
    target: InstanceId,
    out: &mut StatementSet,
) -> PlanResult<()> {
    if def.containment {
        return Err(PlanError::illegal_shape(
            ctx.model.type_name(def.source),
            &def.name,
            "an owned child cannot be attached by bare identifier",
        ));
    }
    // A bare link steals the target from whoever holds the opposite; when
    // that opposite is mandatory single-valued the prior holder would be
    // left below its lower bound.
    if ctx
        .model
        .opposite_of(def.id)
        .is_some_and(|o| o.is_single() && o.is_mandatory())
    {
        return Err(PlanError::forbidden_reference_update(
            ctx.model.type_name(def.source),
            &def.name,
        ));
    }
    out.extend(reference::add_reference(ctx, def.id, &[target], parent_id, true)?);
    Ok(())
}

/// Plan the detachment of the prior child/link. Owned children are deleted
/// outright, association targets keep living without the edge.
fn remove_old(
    ctx: &PlanContext<'_>,
    def: &ReferenceDef,
    parent_id: InstanceId,
    old: InstanceId,
    graph: &InstanceGraph,
    out: &mut StatementSet,
) -> PlanResult<()> {
    if def.containment {
        out.insert(Statement::InstanceExists {
            entity_type: def.source,
            id: parent_id,
        });
        out.extend(reference::remove_reference(ctx, def.id, &[old], parent_id, true)?);
        let child = child_graph(ctx, graph, def, old)?;
        delete::collect(ctx, &child, false, out)?;
    } else {
        out.extend(reference::remove_reference(ctx, def.id, &[old], parent_id, false)?);
    }
    Ok(())
}

/// The persisted snapshot of an owned child, from the parent's snapshot when
/// nested there or freshly collected otherwise.
fn child_graph(
    ctx: &PlanContext<'_>,
    graph: &InstanceGraph,
    def: &ReferenceDef,
    id: InstanceId,
) -> PlanResult<InstanceGraph> {
    match graph.containment_child(def.id, id) {
        Some(child) => Ok(child.clone()),
        None => Ok(ctx.collector.collect_graph(def.target, id)?),
    }
}
