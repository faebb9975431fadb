//! The Model - immutable metamodel lookup.

use crate::{AttrDef, EntityTypeDef, EntityTypeId, ReferenceDef, ReferenceId};
use strata_core::Payload;
use std::collections::HashMap;

/// The Model provides runtime lookup of metamodel definitions.
/// It is immutable after construction.
#[derive(Debug)]
pub struct Model {
    /// Entity type definitions by ID.
    types: HashMap<EntityTypeId, EntityTypeDef>,
    /// Entity type ID lookup by name.
    type_names: HashMap<String, EntityTypeId>,
    /// Reference definitions by ID.
    references: HashMap<ReferenceId, ReferenceDef>,
    /// Transfer (view) type name to backing entity type. Every entity type
    /// maps to itself; additional view names may map to a backing type.
    transfer_types: HashMap<String, EntityTypeId>,
}

impl Model {
    pub(crate) fn new(
        types: HashMap<EntityTypeId, EntityTypeDef>,
        type_names: HashMap<String, EntityTypeId>,
        references: HashMap<ReferenceId, ReferenceDef>,
        transfer_types: HashMap<String, EntityTypeId>,
    ) -> Self {
        Self {
            types,
            type_names,
            references,
            transfer_types,
        }
    }

    // ==================== Entity Type Lookups ====================

    /// Get an entity type definition by ID.
    pub fn entity_type(&self, id: EntityTypeId) -> Option<&EntityTypeDef> {
        self.types.get(&id)
    }

    /// Get an entity type definition by name.
    pub fn type_by_name(&self, name: &str) -> Option<&EntityTypeDef> {
        self.type_names.get(name).and_then(|id| self.types.get(id))
    }

    /// Get an entity type ID by name.
    pub fn type_id(&self, name: &str) -> Option<EntityTypeId> {
        self.type_names.get(name).copied()
    }

    /// Resolve an entity type name for diagnostics.
    pub fn type_name(&self, id: EntityTypeId) -> &str {
        self.entity_type(id).map_or("unknown", |t| t.name.as_str())
    }

    /// Get the number of entity types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // ==================== Metamodel Service Queries ====================

    /// Attributes of an entity type, in declaration order.
    pub fn attributes_of(&self, id: EntityTypeId) -> &[AttrDef] {
        self.entity_type(id).map_or(&[], |t| t.attributes.as_slice())
    }

    /// References held by an entity type, in declaration order.
    pub fn references_of(&self, id: EntityTypeId) -> impl Iterator<Item = &ReferenceDef> {
        self.entity_type(id)
            .into_iter()
            .flat_map(|t| t.references.iter())
            .filter_map(|r| self.references.get(r))
    }

    /// Get a reference definition by ID.
    pub fn reference(&self, id: ReferenceId) -> Option<&ReferenceDef> {
        self.references.get(&id)
    }

    /// Get a reference held by an entity type, by name.
    pub fn reference_by_name(&self, entity_type: EntityTypeId, name: &str) -> Option<&ReferenceDef> {
        self.references_of(entity_type).find(|r| r.name == name)
    }

    /// Resolve a reference name for diagnostics.
    pub fn reference_name(&self, id: ReferenceId) -> &str {
        self.reference(id).map_or("unknown", |r| r.name.as_str())
    }

    /// The reverse navigation of a bidirectional reference.
    pub fn opposite_of(&self, id: ReferenceId) -> Option<&ReferenceDef> {
        self.reference(id)
            .and_then(|r| r.opposite)
            .and_then(|o| self.references.get(&o))
    }

    /// Whether the opposite end of a reference carries the cascade-delete
    /// annotation. Deleting the holder of `id` then cascades into its
    /// targets.
    pub fn is_cascade_delete_on_opposite(&self, id: ReferenceId) -> bool {
        self.opposite_of(id).is_some_and(|o| o.cascade_delete)
    }

    /// Type-level defaults merged into insert payloads.
    pub fn defaults_of(&self, id: EntityTypeId) -> Option<&Payload> {
        self.entity_type(id).map(|t| &t.defaults)
    }

    // ==================== Transfer Type Mapping ====================

    /// The backing entity type of a transfer (view) type name.
    pub fn mapped_entity_type_of(&self, transfer_type: &str) -> Option<EntityTypeId> {
        self.transfer_types.get(transfer_type).copied()
    }

    /// Whether the name denotes a mapped transfer type.
    pub fn is_mapped_transfer_type(&self, transfer_type: &str) -> bool {
        self.transfer_types.contains_key(transfer_type)
    }
}
