//! The Instance Collector boundary.

use crate::InstanceGraph;
use strata_core::InstanceId;
use strata_model::EntityTypeId;
use std::collections::HashMap;
use thiserror::Error;

/// Errors surfaced by an instance collector.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The requested instance is not persisted.
    #[error("Instance not found: {id} of type {entity_type}")]
    InstanceNotFound {
        entity_type: EntityTypeId,
        id: InstanceId,
    },

    /// Store-side failure while assembling a snapshot.
    #[error("Collector failure: {0}")]
    Collector(String),
}

/// Result type for collector operations.
pub type CollectResult<T> = Result<T, CollectError>;

/// Produces the currently persisted neighborhood of instances.
///
/// Implemented by the storage layer. The planner may call it several times
/// per top-level operation; the caller guarantees every read observes the
/// same transactional snapshot.
pub trait InstanceCollector {
    /// Collect snapshots for a set of identifiers of one entity type.
    fn collect_graphs(
        &self,
        entity_type: EntityTypeId,
        ids: &[InstanceId],
    ) -> CollectResult<HashMap<InstanceId, InstanceGraph>>;

    /// Collect the snapshot of a single instance.
    fn collect_graph(
        &self,
        entity_type: EntityTypeId,
        id: InstanceId,
    ) -> CollectResult<InstanceGraph> {
        let mut graphs = self.collect_graphs(entity_type, &[id])?;
        graphs
            .remove(&id)
            .ok_or(CollectError::InstanceNotFound { entity_type, id })
    }
}
