//! ModelBuilder for constructing an immutable Model.

use crate::{AttrDef, EntityTypeDef, EntityTypeId, Model, ReferenceDef, ReferenceId};
use strata_core::Payload;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during model construction.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Duplicate entity type name: {0}")]
    DuplicateTypeName(String),

    #[error("Duplicate reference name: {name} on type {type_name}")]
    DuplicateReferenceName { type_name: String, name: String },

    #[error("Unknown entity type: {0}")]
    UnknownType(String),

    #[error("Reference {type_name}.{name} has no target type")]
    MissingTarget { type_name: String, name: String },

    #[error("Unknown opposite: {opposite} for reference {type_name}.{name}")]
    UnknownOpposite {
        type_name: String,
        name: String,
        opposite: String,
    },

    #[error("Opposite mismatch between {reference} and {opposite}")]
    OppositeMismatch { reference: String, opposite: String },

    #[error("References {reference} and {opposite} are both containments")]
    ContainmentConflict { reference: String, opposite: String },

    #[error("Duplicate transfer type name: {0}")]
    DuplicateTransferType(String),
}

/// Pending reference declaration, resolved at build time.
#[derive(Debug)]
struct ReferenceSpec {
    source: String,
    name: String,
    target: Option<String>,
    lower: u32,
    upper: i32,
    containment: bool,
    opposite: Option<String>,
    changeable: bool,
    cascade_delete: bool,
}

/// Builder for constructing an immutable Model.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    /// Next entity type ID to allocate.
    next_type_id: u32,
    /// Types being built.
    types: HashMap<EntityTypeId, EntityTypeDef>,
    /// Type name to ID mapping.
    type_names: HashMap<String, EntityTypeId>,
    /// References awaiting resolution.
    reference_specs: Vec<ReferenceSpec>,
    /// Transfer type mappings awaiting resolution: view name -> type name.
    transfer_specs: Vec<(String, String)>,
}

impl ModelBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity type definition.
    pub fn add_type(&mut self, name: impl Into<String>) -> TypeBuilder<'_> {
        let name = name.into();
        let id = EntityTypeId::new(self.next_type_id);
        self.next_type_id += 1;

        TypeBuilder {
            builder: self,
            id,
            name,
            attributes: Vec::new(),
        }
    }

    /// Add a reference held by `source_type`.
    pub fn add_reference(
        &mut self,
        source_type: impl Into<String>,
        name: impl Into<String>,
    ) -> ReferenceBuilder<'_> {
        ReferenceBuilder {
            builder: self,
            spec: ReferenceSpec {
                source: source_type.into(),
                name: name.into(),
                target: None,
                lower: 0,
                upper: 1,
                containment: false,
                opposite: None,
                changeable: true,
                cascade_delete: false,
            },
        }
    }

    /// Map a transfer (view) type name onto a backing entity type.
    pub fn map_transfer_type(
        &mut self,
        transfer_type: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> &mut Self {
        self.transfer_specs
            .push((transfer_type.into(), entity_type.into()));
        self
    }

    /// Build the immutable Model.
    pub fn build(mut self) -> Result<Model, ModelError> {
        let mut references: HashMap<ReferenceId, ReferenceDef> = HashMap::new();

        // First pass: allocate ids, resolve source/target types.
        for (index, spec) in self.reference_specs.iter().enumerate() {
            let id = ReferenceId::new(index as u32);
            let source = *self
                .type_names
                .get(&spec.source)
                .ok_or_else(|| ModelError::UnknownType(spec.source.clone()))?;
            let target_name = spec.target.as_ref().ok_or_else(|| ModelError::MissingTarget {
                type_name: spec.source.clone(),
                name: spec.name.clone(),
            })?;
            let target = *self
                .type_names
                .get(target_name)
                .ok_or_else(|| ModelError::UnknownType(target_name.clone()))?;

            references.insert(
                id,
                ReferenceDef {
                    id,
                    name: spec.name.clone(),
                    source,
                    target,
                    lower: spec.lower,
                    upper: spec.upper,
                    containment: spec.containment,
                    opposite: None,
                    changeable: spec.changeable,
                    cascade_delete: spec.cascade_delete,
                },
            );

            if let Some(type_def) = self.types.get_mut(&source) {
                type_def.references.push(id);
            }
        }

        // Second pass: resolve declared opposites by name on the target type.
        for (index, spec) in self.reference_specs.iter().enumerate() {
            let Some(opposite_name) = &spec.opposite else {
                continue;
            };
            let id = ReferenceId::new(index as u32);
            let target = references[&id].target;
            let opposite_id = self.types[&target]
                .references
                .iter()
                .copied()
                .find(|r| references[r].name == *opposite_name)
                .ok_or_else(|| ModelError::UnknownOpposite {
                    type_name: spec.source.clone(),
                    name: spec.name.clone(),
                    opposite: opposite_name.clone(),
                })?;
            if let Some(reference) = references.get_mut(&id) {
                reference.opposite = Some(opposite_id);
            }
        }

        // Symmetry: if a names b as opposite, b must point back at a (or be
        // silent, in which case the back pointer is filled in).
        let pairs: Vec<(ReferenceId, ReferenceId)> = references
            .values()
            .filter_map(|r| r.opposite.map(|o| (r.id, o)))
            .collect();
        for (a, b) in pairs {
            let back = references[&b].opposite;
            match back {
                None => {
                    if let Some(reference) = references.get_mut(&b) {
                        reference.opposite = Some(a);
                    }
                }
                Some(back) if back == a => {}
                Some(_) => {
                    return Err(ModelError::OppositeMismatch {
                        reference: references[&a].name.clone(),
                        opposite: references[&b].name.clone(),
                    });
                }
            }
            if references[&b].target != references[&a].source {
                return Err(ModelError::OppositeMismatch {
                    reference: references[&a].name.clone(),
                    opposite: references[&b].name.clone(),
                });
            }
            // An edge has at most one owning end; two containments would
            // leave both sides treating the other as their container.
            if references[&a].containment && references[&b].containment {
                return Err(ModelError::ContainmentConflict {
                    reference: references[&a].name.clone(),
                    opposite: references[&b].name.clone(),
                });
            }
        }

        // Type-level defaults from attribute declarations.
        for type_def in self.types.values_mut() {
            let mut defaults = Payload::new();
            for attr in &type_def.attributes {
                if let Some(default) = &attr.default {
                    defaults = defaults.with(attr.name.clone(), default.clone());
                }
            }
            type_def.defaults = defaults;
        }

        // Transfer types: every entity type maps to itself, then explicit
        // view mappings on top.
        let mut transfer_types: HashMap<String, EntityTypeId> = self
            .type_names
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        for (view, backing) in &self.transfer_specs {
            let backing_id = *self
                .type_names
                .get(backing)
                .ok_or_else(|| ModelError::UnknownType(backing.clone()))?;
            if transfer_types.insert(view.clone(), backing_id).is_some() {
                return Err(ModelError::DuplicateTransferType(view.clone()));
            }
        }

        Ok(Model::new(
            self.types,
            self.type_names,
            references,
            transfer_types,
        ))
    }
}

/// Builder for a single entity type.
pub struct TypeBuilder<'b> {
    builder: &'b mut ModelBuilder,
    id: EntityTypeId,
    name: String,
    attributes: Vec<AttrDef>,
}

impl<'b> TypeBuilder<'b> {
    /// Add an attribute definition.
    pub fn attr(mut self, attr: AttrDef) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Register the type with the builder.
    pub fn done(self) -> Result<(), ModelError> {
        if self.builder.type_names.contains_key(&self.name) {
            return Err(ModelError::DuplicateTypeName(self.name));
        }
        let mut def = EntityTypeDef::new(self.id, self.name.clone());
        def.attributes = self.attributes;
        self.builder.type_names.insert(self.name, self.id);
        self.builder.types.insert(self.id, def);
        Ok(())
    }
}

/// Builder for a single reference.
pub struct ReferenceBuilder<'b> {
    builder: &'b mut ModelBuilder,
    spec: ReferenceSpec,
}

impl<'b> ReferenceBuilder<'b> {
    /// Set the referenced entity type.
    pub fn to(mut self, target: impl Into<String>) -> Self {
        self.spec.target = Some(target.into());
        self
    }

    /// Set the lower bound; > 0 makes the reference mandatory.
    pub fn lower(mut self, lower: u32) -> Self {
        self.spec.lower = lower;
        self
    }

    /// Set the upper bound; -1 means unbounded.
    pub fn upper(mut self, upper: i32) -> Self {
        self.spec.upper = upper;
        self
    }

    /// Mark the reference as a containment (ownership) edge.
    pub fn containment(mut self) -> Self {
        self.spec.containment = true;
        self
    }

    /// Name the reverse navigation on the target type.
    pub fn opposite(mut self, name: impl Into<String>) -> Self {
        self.spec.opposite = Some(name.into());
        self
    }

    /// Mark the reference derived/read-only; the planner skips it entirely.
    pub fn readonly(mut self) -> Self {
        self.spec.changeable = false;
        self
    }

    /// Carry the cascade-delete annotation: deleting the target of this
    /// reference also deletes its holder.
    pub fn cascade_delete(mut self) -> Self {
        self.spec.cascade_delete = true;
        self
    }

    /// Register the reference with the builder.
    pub fn done(self) -> Result<(), ModelError> {
        let duplicate = self
            .builder
            .reference_specs
            .iter()
            .any(|s| s.source == self.spec.source && s.name == self.spec.name);
        if duplicate {
            return Err(ModelError::DuplicateReferenceName {
                type_name: self.spec.source,
                name: self.spec.name,
            });
        }
        self.builder.reference_specs.push(self.spec);
        Ok(())
    }
}
