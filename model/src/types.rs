//! Metamodel definition types.

use strata_core::{Payload, Value};
use std::fmt;

/// Identifier for an entity type in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityTypeId(pub u32);

impl EntityTypeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Identifier for a reference in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId(pub u32);

impl ReferenceId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Attribute definition within an entity type.
#[derive(Debug, Clone)]
pub struct AttrDef {
    /// Attribute name.
    pub name: String,
    /// Whether this attribute is mandatory (lower bound > 0).
    pub required: bool,
    /// Whether this attribute may be written after creation.
    pub changeable: bool,
    /// Default value applied when an insert payload omits the attribute.
    pub default: Option<Value>,
}

impl AttrDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            changeable: true,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the attribute derived/read-only; the planner skips it entirely.
    pub fn readonly(mut self) -> Self {
        self.changeable = false;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Reference definition between two entity types.
#[derive(Debug, Clone)]
pub struct ReferenceDef {
    /// Unique identifier.
    pub id: ReferenceId,
    /// Reference name on the source type.
    pub name: String,
    /// The entity type holding the reference.
    pub source: EntityTypeId,
    /// The referenced entity type.
    pub target: EntityTypeId,
    /// Lower bound; > 0 means mandatory.
    pub lower: u32,
    /// Upper bound; -1 means unbounded.
    pub upper: i32,
    /// Whether the target's lifecycle is owned by the source.
    pub containment: bool,
    /// The reverse navigation, when the reference is bidirectional.
    pub opposite: Option<ReferenceId>,
    /// Whether this reference may be written after creation.
    pub changeable: bool,
    /// Cascade-delete annotation: deleting the target of this reference
    /// also deletes its holder.
    pub cascade_delete: bool,
}

impl ReferenceDef {
    /// Whether the reference holds at most one target.
    pub fn is_single(&self) -> bool {
        self.upper == 1
    }

    /// Whether the reference holds a collection of targets.
    pub fn is_multi(&self) -> bool {
        self.upper != 1
    }

    /// Whether the reference must hold at least one target.
    pub fn is_mandatory(&self) -> bool {
        self.lower > 0
    }
}

/// Entity type definition.
#[derive(Debug, Clone)]
pub struct EntityTypeDef {
    /// Unique identifier.
    pub id: EntityTypeId,
    /// Type name.
    pub name: String,
    /// Attribute definitions, in declaration order.
    pub attributes: Vec<AttrDef>,
    /// References held by this type, in declaration order.
    pub references: Vec<ReferenceId>,
    /// Type-level defaults merged into insert payloads.
    pub defaults: Payload,
}

impl EntityTypeDef {
    pub fn new(id: EntityTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: Vec::new(),
            references: Vec::new(),
            defaults: Payload::new(),
        }
    }

    /// Get an attribute definition by name.
    pub fn get_attr(&self, name: &str) -> Option<&AttrDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check if this type has an attribute.
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }
}
