//! Strata Core Types
//!
//! This crate provides the foundational types used throughout the strata
//! planning core:
//! - Identity types (InstanceId) and the IdentifierProvider capability
//! - Value types (the scalar Value enum)
//! - Payload trees (the partially-identified desired-state input)
//! - Call metadata (audit fields stamped on Insert/Update)

mod id;
mod metadata;
mod payload;
mod value;

pub use id::*;
pub use metadata::*;
pub use payload::*;
pub use value::*;
