//! Planning error types.
//!
//! Every variant is a rejection of the requested mutation, raised eagerly
//! during traversal; no partial statement set is ever returned. Circular
//! deletes are not errors: the first visit already scheduled the deletion,
//! so traversal short-circuits with a debug event instead.

use strata_core::InstanceId;
use strata_graph::CollectError;
use thiserror::Error;

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that can occur while planning statements.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("No backing entity type for transfer type: {name}")]
    UnmappedType { name: String },

    #[error("Missing mandatory feature: {feature} on type {type_name}")]
    MissingMandatoryFeature { type_name: String, feature: String },

    #[error("Illegal payload shape for {type_name}.{feature}: {message}")]
    IllegalPayloadShape {
        type_name: String,
        feature: String,
        message: String,
    },

    #[error("Forbidden reference update: {type_name}.{reference} would violate its mandatory single-valued opposite")]
    ForbiddenReferenceUpdate { type_name: String, reference: String },

    #[error("Deleting {id} of type {type_name} would dangle mandatory reference {reference}")]
    DanglingMandatoryReference {
        type_name: String,
        id: InstanceId,
        reference: String,
    },

    #[error("Optimistic lock conflict on {id} of type {type_name}: expected version {expected}, got {actual}")]
    OptimisticLockConflict {
        type_name: String,
        id: InstanceId,
        expected: i64,
        actual: i64,
    },

    #[error(transparent)]
    Collect(#[from] CollectError),
}

impl PlanError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn unmapped_type(name: impl Into<String>) -> Self {
        Self::UnmappedType { name: name.into() }
    }

    pub fn missing_mandatory(type_name: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::MissingMandatoryFeature {
            type_name: type_name.into(),
            feature: feature.into(),
        }
    }

    pub fn illegal_shape(
        type_name: impl Into<String>,
        feature: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::IllegalPayloadShape {
            type_name: type_name.into(),
            feature: feature.into(),
            message: message.into(),
        }
    }

    pub fn forbidden_reference_update(
        type_name: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self::ForbiddenReferenceUpdate {
            type_name: type_name.into(),
            reference: reference.into(),
        }
    }

    pub fn dangling_mandatory(
        type_name: impl Into<String>,
        id: InstanceId,
        reference: impl Into<String>,
    ) -> Self {
        Self::DanglingMandatoryReference {
            type_name: type_name.into(),
            id,
            reference: reference.into(),
        }
    }

    pub fn optimistic_lock(
        type_name: impl Into<String>,
        id: InstanceId,
        expected: i64,
        actual: i64,
    ) -> Self {
        Self::OptimisticLockConflict {
            type_name: type_name.into(),
            id,
            expected,
            actual,
        }
    }
}
