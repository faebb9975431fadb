//! In-memory instance store.

use std::collections::{BTreeMap, HashMap};

use strata_core::{InstanceId, Value};
use strata_graph::{CollectError, CollectResult, InstanceCollector, InstanceGraph};
use strata_model::{EntityTypeId, Model, ReferenceId};
use strata_plan::{Statement, StatementSet};

use crate::error::{StoreError, StoreResult};

/// One persisted instance.
#[derive(Debug, Clone)]
pub struct StoredInstance {
    pub id: InstanceId,
    pub entity_type: EntityTypeId,
    pub version: i64,
    pub attributes: BTreeMap<String, Value>,
    pub references: Vec<(ReferenceId, InstanceId)>,
}

/// A store that collects instance graphs for the planner and executes the
/// statements it returns.
pub struct MemoryStore<'m> {
    model: &'m Model,
    instances: HashMap<InstanceId, StoredInstance>,
}

impl<'m> MemoryStore<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self {
            model,
            instances: HashMap::new(),
        }
    }

    /// Put an instance with the given attributes directly into the store.
    pub fn seed(
        &mut self,
        entity_type: EntityTypeId,
        id: u64,
        attributes: &[(&str, Value)],
    ) -> InstanceId {
        let id = InstanceId::new(id);
        self.instances.insert(
            id,
            StoredInstance {
                id,
                entity_type,
                version: 1,
                attributes: attributes
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
                references: Vec::new(),
            },
        );
        id
    }

    /// Put a forward edge directly into the store.
    pub fn link(&mut self, holder: InstanceId, reference: ReferenceId, target: InstanceId) {
        if let Some(instance) = self.instances.get_mut(&holder) {
            instance.references.push((reference, target));
        }
    }

    pub fn get(&self, id: InstanceId) -> Option<&StoredInstance> {
        self.instances.get(&id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// All edges held by `holder` through `reference`.
    pub fn targets_of(&self, holder: InstanceId, reference: ReferenceId) -> Vec<InstanceId> {
        self.instances
            .get(&holder)
            .map(|instance| {
                instance
                    .references
                    .iter()
                    .filter(|(r, _)| *r == reference)
                    .map(|(_, target)| *target)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Execute one planner call's statements against the store.
    ///
    /// Statement sets are unordered; execution imposes the two hard
    /// orderings (inserts before links, detaches before deletes) and runs
    /// existence checks against the pre-state.
    pub fn apply(&mut self, statements: &StatementSet) -> StoreResult<()> {
        for statement in statements.iter() {
            if let Statement::InstanceExists { id, .. } = statement {
                if !self.instances.contains_key(id) {
                    return Err(StoreError::MissingInstance { id: *id });
                }
            }
        }
        let phases: [fn(&Statement) -> bool; 3] = [
            |s| s.is_insert() || s.is_update(),
            |s| s.is_add_reference() || s.is_remove_reference(),
            Statement::is_delete,
        ];
        for phase in phases {
            for statement in statements.iter().filter(|s| phase(s)) {
                self.execute(statement)?;
            }
        }
        Ok(())
    }

    fn execute(&mut self, statement: &Statement) -> StoreResult<()> {
        match statement {
            Statement::InstanceExists { .. } => {}
            Statement::Insert {
                id,
                entity_type,
                attributes,
                version,
                ..
            } => {
                if self.instances.contains_key(id) {
                    return Err(StoreError::DuplicateInstance { id: *id });
                }
                self.instances.insert(
                    *id,
                    StoredInstance {
                        id: *id,
                        entity_type: *entity_type,
                        version: *version,
                        attributes: attributes.clone(),
                        references: Vec::new(),
                    },
                );
            }
            Statement::Update { id, attributes, .. } => {
                let instance = self
                    .instances
                    .get_mut(id)
                    .ok_or(StoreError::MissingInstance { id: *id })?;
                instance
                    .attributes
                    .extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
                instance.version += 1;
            }
            Statement::Delete { id, .. } => {
                self.instances.remove(id);
                for instance in self.instances.values_mut() {
                    instance.references.retain(|(_, target)| target != id);
                }
            }
            Statement::AddReference {
                reference,
                id,
                referenced_id,
                already_referencing,
                ..
            } => {
                // Implicit detach-and-reattach: prior holders of a
                // single-valued opposite lose the edge first.
                if let Some(holders) = already_referencing {
                    for holder in holders {
                        if let Some(instance) = self.instances.get_mut(holder) {
                            instance
                                .references
                                .retain(|edge| edge != &(*reference, *referenced_id));
                        }
                    }
                }
                let instance = self
                    .instances
                    .get_mut(id)
                    .ok_or(StoreError::MissingInstance { id: *id })?;
                if !instance.references.contains(&(*reference, *referenced_id)) {
                    instance.references.push((*reference, *referenced_id));
                }
            }
            Statement::RemoveReference {
                reference,
                id,
                referenced_id,
                ..
            } => {
                if let Some(instance) = self.instances.get_mut(id) {
                    instance
                        .references
                        .retain(|edge| edge != &(*reference, *referenced_id));
                }
            }
        }
        Ok(())
    }

    fn build_graph(&self, instance: &StoredInstance) -> InstanceGraph {
        let mut graph = InstanceGraph::new(instance.id, instance.entity_type);
        for (reference, target) in &instance.references {
            let containment = self
                .model
                .reference(*reference)
                .is_some_and(|def| def.containment);
            match self.instances.get(target) {
                Some(child) if containment => {
                    graph = graph.with_containment(*reference, self.build_graph(child));
                }
                _ => {
                    graph = graph.with_reference(*reference, *target);
                }
            }
        }
        for other in self.instances.values() {
            for (reference, target) in &other.references {
                if *target == instance.id {
                    graph = graph.with_back_reference(*reference, other.id);
                }
            }
        }
        graph
    }
}

impl InstanceCollector for MemoryStore<'_> {
    fn collect_graphs(
        &self,
        entity_type: EntityTypeId,
        ids: &[InstanceId],
    ) -> CollectResult<HashMap<InstanceId, InstanceGraph>> {
        ids.iter()
            .map(|id| {
                self.instances
                    .get(id)
                    .filter(|instance| instance.entity_type == entity_type)
                    .map(|instance| (*id, self.build_graph(instance)))
                    .ok_or(CollectError::InstanceNotFound {
                        entity_type,
                        id: *id,
                    })
            })
            .collect()
    }
}
