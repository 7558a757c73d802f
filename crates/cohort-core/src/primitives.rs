//! # Roster Primitives
//!
//! Fixed constants for grading and cohort planning.
//!
//! These values are compiled into the binary and are immutable at runtime.

/// Lowest grade a student can hold.
pub const MIN_GRADE: f64 = 0.0;

/// Highest grade a student can hold.
pub const MAX_GRADE: f64 = 5.0;

/// Grade assigned to a student that has never been graded.
///
/// Analytics treat it exactly like an explicit zero.
pub const UNSET_GRADE: f64 = 0.0;

/// Fewest groups a roster may be divided into.
pub const MIN_GROUP_COUNT: usize = 2;

/// Fewest students a single group may hold.
pub const MIN_GROUP_SIZE: usize = 2;

/// One in every `TOP_SCORER_DIVISOR` students is reported as a top scorer.
pub const TOP_SCORER_DIVISOR: usize = 4;

/// Current version of the JSON roster file.
///
/// Increment this when making breaking changes to the file layout.
pub const ROSTER_FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for name fields.
pub const MAX_NAME_LENGTH: usize = 128;

/// Maximum length for an email address.
pub const MAX_EMAIL_LENGTH: usize = 254;
