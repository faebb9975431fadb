//! Identity types for persisted instances.
//!
//! Identifiers are 64-bit values that are:
//! - Unique within the store
//! - Immutable once assigned
//! - Opaque to external users

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a persisted instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl InstanceId {
    /// Create a new InstanceId from a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Capability for minting fresh instance identifiers.
///
/// Insert planning needs a new identity per created instance; the provider
/// is passed in explicitly so identifier allocation is never ambient state.
pub trait IdentifierProvider {
    /// Mint the next fresh identifier.
    fn next_id(&self) -> InstanceId;
}

/// Monotonic in-process identifier provider.
#[derive(Debug)]
pub struct SequenceProvider {
    next: AtomicU64,
}

impl SequenceProvider {
    /// Create a provider that starts at the given value.
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl Default for SequenceProvider {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdentifierProvider for SequenceProvider {
    fn next_id(&self) -> InstanceId {
        InstanceId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
