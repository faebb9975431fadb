//! INSERT processor - decompose a payload tree into creation statements.

use strata_core::{InstanceId, Payload};
use strata_model::EntityTypeId;
use std::collections::BTreeMap;

use crate::error::{PlanError, PlanResult};
use crate::ops::{reference, PlanContext};
use crate::statement::{Statement, StatementSet};
use crate::validation;

/// Plan the creation of a new instance tree from a payload with no root
/// identifier. Embedded sub-objects become further Inserts; identified
/// sub-objects become AddReference links to pre-existing instances.
pub fn insert(
    ctx: &PlanContext<'_>,
    type_name: &str,
    payload: &Payload,
    check_mandatory: bool,
) -> PlanResult<StatementSet> {
    let entity_type = ctx
        .model
        .mapped_entity_type_of(type_name)
        .ok_or_else(|| PlanError::unmapped_type(type_name))?;
    if payload.id().is_some() {
        return Err(PlanError::invalid_argument(
            "insert payload must not carry an identifier; insert always creates a new identity",
        ));
    }
    let mut out = StatementSet::new();
    collect(ctx, entity_type, payload, None, check_mandatory, &mut out)?;
    Ok(out)
}

/// Recursive statement collection for one payload node. Returns the fresh
/// identifier assigned to the node so callers can link to it.
pub(crate) fn collect(
    ctx: &PlanContext<'_>,
    entity_type: EntityTypeId,
    payload: &Payload,
    container: Option<strata_model::ReferenceId>,
    check_mandatory: bool,
    out: &mut StatementSet,
) -> PlanResult<InstanceId> {
    let type_name = ctx.model.type_name(entity_type);

    // Type-level defaults fill any feature the payload omits.
    let payload = match ctx.model.defaults_of(entity_type) {
        Some(defaults) if !defaults.is_empty() => payload.merged_defaults(defaults),
        _ => payload.clone(),
    };

    // The reference pointing back at the container; re-inserting the parent
    // through it would loop.
    let parent_reference = container
        .and_then(|c| ctx.model.opposite_of(c))
        .map(|opposite| opposite.id);

    let mut attributes = BTreeMap::new();
    for attr in ctx.model.attributes_of(entity_type) {
        if !attr.changeable {
            continue;
        }
        if let Some(value) = validation::attr_scalar(type_name, &attr.name, &payload)? {
            attributes.insert(attr.name.clone(), value.clone());
        }
    }

    if check_mandatory {
        validation::check_mandatory_attributes(ctx.model, entity_type, &payload)?;
        validation::check_mandatory_references(ctx.model, entity_type, &payload, parent_reference)?;
    }

    let id = ctx.ids.next_id();
    out.insert(Statement::Insert {
        id,
        entity_type,
        container,
        attributes,
        version: 1,
        user_id: ctx.metadata.user_id.clone(),
        username: ctx.metadata.username.clone(),
        timestamp: ctx.metadata.timestamp,
    });

    for def in ctx.model.references_of(entity_type) {
        if !def.changeable || Some(def.id) == parent_reference || !payload.contains(&def.name) {
            continue;
        }
        let entries: Vec<&Payload> = if def.is_single() {
            validation::single_entry(type_name, &def.name, &payload)?
                .into_iter()
                .collect()
        } else {
            validation::list_entries(type_name, &def.name, &payload)?.unwrap_or_default()
        };

        for entry in entries {
            match entry.id() {
                // Embedded: a brand-new instance reached through this
                // reference. Containment children are linked to the new
                // parent explicitly; the Insert's container field carries
                // the rest.
                None => {
                    let child =
                        collect(ctx, def.target, entry, Some(def.id), check_mandatory, out)?;
                    if def.containment {
                        out.extend(reference::add_reference(ctx, def.id, &[child], id, false)?);
                    }
                }
                // Linked: the only path that re-attaches a pre-existing
                // instance, so the executor must check it exists.
                Some(existing) => {
                    out.extend(reference::add_reference(ctx, def.id, &[existing], id, true)?);
                }
            }
        }
    }

    Ok(id)
}
