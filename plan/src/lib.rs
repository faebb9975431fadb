//! Strata Statement Planning
//!
//! Plan persistence statements (INSERT/UPDATE/DELETE/ADD-REFERENCE/
//! REMOVE-REFERENCE/EXISTENCE-CHECK) from desired-state payloads and
//! persisted instance graphs.
//!
//! Responsibilities:
//! - Diff payload trees against persisted state
//! - Enforce mandatory-feature, payload-shape and optimistic-lock invariants
//! - Handle cascade deletions and referential-integrity ordering
//! - Return a deduplicated statement set; execution belongs to the caller
//!
//! # Module Structure
//!
//! - `planner` - Main StatementPlanner that coordinates operations
//! - `ops/` - Individual processor implementations (insert, update, delete,
//!   reference)
//! - `validation` - Shared payload/mandatory validation helpers
//! - `error` - Error types for rejected mutations
//! - `statement` - The statement model and deduplicating statement set

mod error;
mod ops;
mod planner;
mod statement;
mod validation;

pub use error::{PlanError, PlanResult};
pub use planner::StatementPlanner;
pub use statement::{Statement, StatementSet};
