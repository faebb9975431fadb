//! Payload trees describing desired state.
//!
//! A payload is an ordered map from feature name to entry, where an entry is
//! a scalar, a nested payload (single-valued reference) or a sequence of
//! payloads (multi-valued reference). Payloads are partial: an absent key
//! means "leave untouched". Three well-known keys carry identity, a
//! polymorphic type override, and the optimistic-lock version.
//!
//! All helpers are pure transformations; the planner never mutates a payload
//! it was handed.

use crate::{InstanceId, Value};
use std::collections::BTreeMap;

/// Well-known key carrying the instance identifier.
pub const ID_KEY: &str = "__id";
/// Well-known key overriding the entity type (polymorphic payloads).
pub const TYPE_KEY: &str = "__type";
/// Well-known key carrying the optimistic-lock version.
pub const VERSION_KEY: &str = "__version";

/// A single payload entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A scalar attribute value.
    Scalar(Value),
    /// A nested payload (single-valued reference).
    Object(Payload),
    /// A sequence of payloads (multi-valued reference).
    List(Vec<Payload>),
}

impl Entry {
    /// Get as scalar if this is a Scalar entry.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Entry::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Get as nested payload if this is an Object entry.
    pub fn as_object(&self) -> Option<&Payload> {
        match self {
            Entry::Object(p) => Some(p),
            _ => None,
        }
    }

    /// Get as payload sequence if this is a List entry.
    pub fn as_list(&self) -> Option<&[Payload]> {
        match self {
            Entry::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns true if this entry is an explicit null scalar.
    pub fn is_null(&self) -> bool {
        matches!(self, Entry::Scalar(Value::Null))
    }
}

impl From<Value> for Entry {
    fn from(v: Value) -> Self {
        Entry::Scalar(v)
    }
}

impl From<Payload> for Entry {
    fn from(p: Payload) -> Self {
        Entry::Object(p)
    }
}

impl From<Vec<Payload>> for Entry {
    fn from(l: Vec<Payload>) -> Self {
        Entry::List(l)
    }
}

/// An ordered, partially-identified desired-state tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Payload {
    entries: BTreeMap<String, Entry>,
}

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume and return the payload with the given entry added.
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.entries.insert(key.into(), entry.into());
        self
    }

    /// Consume and return the payload carrying the given identifier.
    pub fn with_id(self, id: InstanceId) -> Self {
        self.with(ID_KEY, Value::Id(id))
    }

    /// Consume and return the payload carrying the given version.
    pub fn with_version(self, version: i64) -> Self {
        self.with(VERSION_KEY, Value::Int(version))
    }

    /// Consume and return the payload carrying an entity-type override.
    pub fn with_type(self, type_name: impl Into<String>) -> Self {
        self.with(TYPE_KEY, Value::String(type_name.into()))
    }

    /// Get an entry by feature name.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Check whether a feature is present (explicit null counts as present).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The instance identifier, if this payload carries one.
    pub fn id(&self) -> Option<InstanceId> {
        self.get(ID_KEY).and_then(Entry::as_scalar).and_then(Value::as_id)
    }

    /// The optimistic-lock version, if this payload carries one.
    pub fn version(&self) -> Option<i64> {
        self.get(VERSION_KEY)
            .and_then(Entry::as_scalar)
            .and_then(Value::as_int)
    }

    /// The entity-type override, if this payload carries one.
    pub fn type_override(&self) -> Option<&str> {
        self.get(TYPE_KEY).and_then(Entry::as_scalar).and_then(Value::as_str)
    }

    /// Produce a new payload with entries from `defaults` filled in for any
    /// feature missing here. Present entries always win.
    pub fn merged_defaults(&self, defaults: &Payload) -> Payload {
        let mut merged = self.clone();
        for (key, entry) in &defaults.entries {
            merged
                .entries
                .entry(key.clone())
                .or_insert_with(|| entry.clone());
        }
        merged
    }

    /// Iterate entries in feature-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Entry)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the payload has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Helper macro to build payloads in tests and callers.
#[macro_export]
macro_rules! payload {
    () => {
        $crate::Payload::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut p = $crate::Payload::new();
            $(
                p = p.with($key, $crate::Entry::from($value));
            )+
            p
        }
    };
}
