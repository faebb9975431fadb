//! The instance graph snapshot.

use strata_core::InstanceId;
use strata_model::{EntityTypeId, ReferenceId};

/// The currently-persisted neighborhood of one instance, as returned by the
/// Instance Collector.
///
/// Containments are the composition tree (children carried as nested
/// graphs); `references` are non-containment forward edges; back-references
/// are incoming edges from other instances, containment parents included.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceGraph {
    /// Identifier of the instance at the root of this snapshot.
    pub id: InstanceId,
    /// Entity type of the instance.
    pub entity_type: EntityTypeId,
    /// Owned children, in persisted order.
    pub containments: Vec<(ReferenceId, InstanceGraph)>,
    /// Non-containment forward edges.
    pub references: Vec<(ReferenceId, InstanceId)>,
    /// Incoming edges from other instances.
    pub back_references: Vec<(ReferenceId, InstanceId)>,
}

impl InstanceGraph {
    /// Create a snapshot with no edges.
    pub fn new(id: InstanceId, entity_type: EntityTypeId) -> Self {
        Self {
            id,
            entity_type,
            containments: Vec::new(),
            references: Vec::new(),
            back_references: Vec::new(),
        }
    }

    /// Consume and return the snapshot with an owned child attached.
    pub fn with_containment(mut self, reference: ReferenceId, child: InstanceGraph) -> Self {
        self.containments.push((reference, child));
        self
    }

    /// Consume and return the snapshot with a forward edge attached.
    pub fn with_reference(mut self, reference: ReferenceId, target: InstanceId) -> Self {
        self.references.push((reference, target));
        self
    }

    /// Consume and return the snapshot with an incoming edge attached.
    pub fn with_back_reference(mut self, reference: ReferenceId, source: InstanceId) -> Self {
        self.back_references.push((reference, source));
        self
    }

    /// Find an owned child by containment reference and identifier.
    pub fn containment_child(&self, reference: ReferenceId, id: InstanceId) -> Option<&InstanceGraph> {
        self.containments
            .iter()
            .find(|(r, child)| *r == reference && child.id == id)
            .map(|(_, child)| child)
    }

    /// Incoming edges arriving through the given reference.
    pub fn back_references_via(&self, reference: ReferenceId) -> impl Iterator<Item = InstanceId> + '_ {
        self.back_references
            .iter()
            .filter(move |(r, _)| *r == reference)
            .map(|(_, source)| *source)
    }

    /// Identifiers reachable from this instance through containment,
    /// this instance included.
    pub fn containment_closure(&self) -> Vec<InstanceId> {
        let mut ids = vec![self.id];
        for (_, child) in &self.containments {
            ids.extend(child.containment_closure());
        }
        ids
    }
}
