//! Payload validation helpers shared by the processors.

use crate::error::{PlanError, PlanResult};
use strata_core::{Entry, Payload, Value};
use strata_model::{EntityTypeId, Model, ReferenceId};

/// Read an attribute entry, requiring scalar shape when present.
pub fn attr_scalar<'p>(
    type_name: &str,
    attr_name: &str,
    payload: &'p Payload,
) -> PlanResult<Option<&'p Value>> {
    match payload.get(attr_name) {
        None => Ok(None),
        Some(Entry::Scalar(value)) => Ok(Some(value)),
        Some(_) => Err(PlanError::illegal_shape(
            type_name,
            attr_name,
            "attribute value must be a scalar",
        )),
    }
}

/// Read a single-valued reference entry, requiring object shape when
/// present. Explicit null reads as "no value".
pub fn single_entry<'p>(
    type_name: &str,
    ref_name: &str,
    payload: &'p Payload,
) -> PlanResult<Option<&'p Payload>> {
    match payload.get(ref_name) {
        None => Ok(None),
        Some(Entry::Scalar(Value::Null)) => Ok(None),
        Some(Entry::Object(object)) => Ok(Some(object)),
        Some(_) => Err(PlanError::illegal_shape(
            type_name,
            ref_name,
            "single-valued reference payload must be an object",
        )),
    }
}

/// Read a multi-valued reference entry, requiring sequence shape when
/// present. Explicit null reads as an empty sequence.
pub fn list_entries<'p>(
    type_name: &str,
    ref_name: &str,
    payload: &'p Payload,
) -> PlanResult<Option<Vec<&'p Payload>>> {
    match payload.get(ref_name) {
        None => Ok(None),
        Some(Entry::Scalar(Value::Null)) => Ok(Some(Vec::new())),
        Some(Entry::List(list)) => Ok(Some(list.iter().collect())),
        Some(_) => Err(PlanError::illegal_shape(
            type_name,
            ref_name,
            "multi-valued reference payload must be a sequence",
        )),
    }
}

/// Check that every mandatory changeable attribute is present and non-null.
pub fn check_mandatory_attributes(
    model: &Model,
    entity_type: EntityTypeId,
    payload: &Payload,
) -> PlanResult<()> {
    let type_name = model.type_name(entity_type);
    for attr in model.attributes_of(entity_type) {
        if !attr.required || !attr.changeable {
            continue;
        }
        match attr_scalar(type_name, &attr.name, payload)? {
            Some(value) if !value.is_null() => {}
            _ => return Err(PlanError::missing_mandatory(type_name, &attr.name)),
        }
    }
    Ok(())
}

/// Check that every mandatory changeable non-parent reference holds at
/// least one entry. The reference arriving from the container's opposite is
/// excluded: the parent is being created in the same batch.
pub fn check_mandatory_references(
    model: &Model,
    entity_type: EntityTypeId,
    payload: &Payload,
    parent_reference: Option<ReferenceId>,
) -> PlanResult<()> {
    let type_name = model.type_name(entity_type);
    for reference in model.references_of(entity_type) {
        if !reference.is_mandatory() || !reference.changeable {
            continue;
        }
        if Some(reference.id) == parent_reference {
            continue;
        }
        let present = if reference.is_single() {
            single_entry(type_name, &reference.name, payload)?.is_some()
        } else {
            list_entries(type_name, &reference.name, payload)?.is_some_and(|l| !l.is_empty())
        };
        if !present {
            return Err(PlanError::missing_mandatory(type_name, &reference.name));
        }
    }
    Ok(())
}
