//! Call metadata stamped on Insert/Update statements.

/// Audit fields supplied by the caller for one planner call.
///
/// The core never computes these; the dispatcher that authenticated the
/// actor passes them in explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Identifier of the acting user.
    pub user_id: String,
    /// Display name of the acting user.
    pub username: String,
    /// Call timestamp as milliseconds since Unix epoch.
    pub timestamp: i64,
}

impl Metadata {
    /// Create metadata for one call.
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, timestamp: i64) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            timestamp,
        }
    }
}
