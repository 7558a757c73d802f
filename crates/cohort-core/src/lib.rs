//! # cohort-core
//!
//! The student roster engine - THE LOGIC.
//!
//! This crate holds the student record, the storage collaborator and the
//! cohort analytics built on top of it:
//! - `planner`: divide a roster into groups by count or by size
//! - `analytics`: average grade and top scorers
//! - `grade`: grade-string validation
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Has NO async, NO network dependencies (pure Rust)
//! - Performs no transport mapping; failures carry an `ErrorClass`
//! - Keeps analytics stateless: each call reads the roster it is given

// =============================================================================
// MODULES
// =============================================================================

pub mod analytics;
pub mod backend;
pub mod formats;
pub mod grade;
pub mod planner;
pub mod primitives;
pub mod service;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AnalyticsError, CohortError, ErrorClass, GradeError, PlanError, StoreError, Student, StudentId,
};

// =============================================================================
// RE-EXPORTS: Analytics
// =============================================================================

pub use analytics::{average_grade, mean_grade, top_scorer_count, top_scoring_students};
pub use grade::parse_grade;
pub use planner::{GroupPlan, plan_by_group_count, plan_by_group_size};

// =============================================================================
// RE-EXPORTS: Storage and Services
// =============================================================================

pub use backend::StorageBackend;
pub use formats::{RosterFile, roster_from_json, roster_to_json};
pub use service::{SchoolService, StudentService};
pub use storage::RedbStore;
pub use store::{MemoryStore, StudentStore};
