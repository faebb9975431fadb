//! The statement model - atomic persistence operations.
//!
//! Statements are the sole output contract of the planning core. The
//! executing collaborator applies one planner call's statements inside a
//! single transaction, resolving `already_referencing` on AddReference as
//! an implicit detach-and-reattach.

use strata_core::{InstanceId, Value};
use strata_model::{EntityTypeId, ReferenceId};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// An atomic persistence statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Assert the instance exists before referring to or mutating it.
    InstanceExists {
        entity_type: EntityTypeId,
        id: InstanceId,
    },

    /// Create a new instance.
    Insert {
        id: InstanceId,
        entity_type: EntityTypeId,
        /// The reference through which the instance was reached; None at the
        /// root of an insert payload.
        container: Option<ReferenceId>,
        attributes: BTreeMap<String, Value>,
        version: i64,
        user_id: String,
        username: String,
        timestamp: i64,
    },

    /// Write changed attributes of an existing instance.
    Update {
        id: InstanceId,
        entity_type: EntityTypeId,
        /// Optimistic-lock version carried by the update payload.
        version: Option<i64>,
        attributes: BTreeMap<String, Value>,
        user_id: String,
        username: String,
        timestamp: i64,
    },

    /// Remove an instance.
    Delete {
        id: InstanceId,
        entity_type: EntityTypeId,
    },

    /// Attach a reference edge from `id` to `referenced_id`.
    AddReference {
        entity_type: EntityTypeId,
        reference: ReferenceId,
        id: InstanceId,
        referenced_id: InstanceId,
        /// Prior holders of a single-valued opposite; the executor performs
        /// the implicit detach-and-reattach in one step.
        already_referencing: Option<BTreeSet<InstanceId>>,
    },

    /// Detach a reference edge from `id` to `referenced_id`.
    RemoveReference {
        entity_type: EntityTypeId,
        reference: ReferenceId,
        id: InstanceId,
        referenced_id: InstanceId,
    },
}

impl Statement {
    /// The identity of the instance this statement addresses.
    pub fn id(&self) -> InstanceId {
        match self {
            Statement::InstanceExists { id, .. }
            | Statement::Insert { id, .. }
            | Statement::Update { id, .. }
            | Statement::Delete { id, .. }
            | Statement::AddReference { id, .. }
            | Statement::RemoveReference { id, .. } => *id,
        }
    }

    /// The entity type this statement addresses.
    pub fn entity_type(&self) -> EntityTypeId {
        match self {
            Statement::InstanceExists { entity_type, .. }
            | Statement::Insert { entity_type, .. }
            | Statement::Update { entity_type, .. }
            | Statement::Delete { entity_type, .. }
            | Statement::AddReference { entity_type, .. }
            | Statement::RemoveReference { entity_type, .. } => *entity_type,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Statement::Insert { .. })
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Statement::Update { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Statement::Delete { .. })
    }

    pub fn is_add_reference(&self) -> bool {
        matches!(self, Statement::AddReference { .. })
    }

    pub fn is_remove_reference(&self) -> bool {
        matches!(self, Statement::RemoveReference { .. })
    }

    pub fn is_existence_check(&self) -> bool {
        matches!(self, Statement::InstanceExists { .. })
    }

    /// Deduplication key: (kind, type, identifier), extended with the edge
    /// pair for reference statements.
    fn key(&self) -> StatementKey {
        match self {
            Statement::InstanceExists { entity_type, id } => {
                StatementKey::Exists(*entity_type, *id)
            }
            Statement::Insert {
                id, entity_type, ..
            } => StatementKey::Insert(*entity_type, *id),
            Statement::Update {
                id, entity_type, ..
            } => StatementKey::Update(*entity_type, *id),
            Statement::Delete { id, entity_type } => StatementKey::Delete(*entity_type, *id),
            Statement::AddReference {
                entity_type,
                reference,
                id,
                referenced_id,
                ..
            } => StatementKey::AddReference(*entity_type, *reference, *id, *referenced_id),
            Statement::RemoveReference {
                entity_type,
                reference,
                id,
                referenced_id,
            } => StatementKey::RemoveReference(*entity_type, *reference, *id, *referenced_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StatementKey {
    Exists(EntityTypeId, InstanceId),
    Insert(EntityTypeId, InstanceId),
    Update(EntityTypeId, InstanceId),
    Delete(EntityTypeId, InstanceId),
    AddReference(EntityTypeId, ReferenceId, InstanceId, InstanceId),
    RemoveReference(EntityTypeId, ReferenceId, InstanceId, InstanceId),
}

/// Insertion-ordered, deduplicated statement container.
///
/// The set is unordered by contract, but insertion order is preserved so the
/// two hard orderings (detach-before-delete, insert-before-link) stay
/// visible to the executor.
#[derive(Debug, Default)]
pub struct StatementSet {
    statements: Vec<Statement>,
    keys: HashSet<StatementKey>,
}

impl StatementSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a statement; returns false when an equivalent statement is
    /// already queued.
    pub fn insert(&mut self, statement: Statement) -> bool {
        if self.keys.insert(statement.key()) {
            self.statements.push(statement);
            true
        } else {
            false
        }
    }

    /// Union another set into this one, preserving first-seen order.
    pub fn extend(&mut self, other: StatementSet) {
        for statement in other.statements {
            self.insert(statement);
        }
    }

    /// Whether a Delete for (type, id) is already queued. Used as the cycle
    /// guard during delete traversal.
    pub fn contains_delete(&self, entity_type: EntityTypeId, id: InstanceId) -> bool {
        self.keys.contains(&StatementKey::Delete(entity_type, id))
    }

    /// Iterate statements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true when no statements are queued.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl IntoIterator for StatementSet {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a StatementSet {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
