//! # Group Planner
//!
//! Works out how a roster of a given size splits into groups.
//!
//! Two modes are supported:
//! - group-count: a target number of groups, students spread evenly
//! - group-size: a target number of students per group
//!
//! Students left over after integer division are reported as "hanging".
//! Both planners are pure functions of their two inputs.

use crate::primitives::{MIN_GROUP_COUNT, MIN_GROUP_SIZE};
use crate::types::PlanError;
use std::fmt;

/// A feasible way of dividing a roster.
///
/// `Display` renders the planning message returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPlan {
    /// Result of dividing into a fixed number of groups.
    ByCount {
        group_count: usize,
        students_per_group: usize,
        remainder: usize,
    },
    /// Result of dividing into groups of a fixed size.
    BySize {
        group_size: usize,
        group_count: usize,
        remainder: usize,
    },
}

impl GroupPlan {
    /// Number of students that do not fit into any group.
    #[must_use]
    pub fn remainder(&self) -> usize {
        match *self {
            Self::ByCount { remainder, .. } | Self::BySize { remainder, .. } => remainder,
        }
    }

    /// Number of groups formed.
    #[must_use]
    pub fn group_count(&self) -> usize {
        match *self {
            Self::ByCount { group_count, .. } | Self::BySize { group_count, .. } => group_count,
        }
    }

    /// Number of students in each group.
    #[must_use]
    pub fn students_per_group(&self) -> usize {
        match *self {
            Self::ByCount {
                students_per_group, ..
            } => students_per_group,
            Self::BySize { group_size, .. } => group_size,
        }
    }
}

impl fmt::Display for GroupPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ByCount {
                group_count,
                students_per_group,
                remainder,
            } => {
                write!(
                    f,
                    "{} groups could be formed with {} students per group",
                    group_count, students_per_group
                )?;
                if remainder > 0 {
                    write!(f, ", but that would leave {}", hanging(remainder))?;
                }
                Ok(())
            }
            Self::BySize {
                group_size,
                group_count,
                remainder,
            } => {
                write!(
                    f,
                    "{} students per group is possible, there will be {} groups",
                    group_size, group_count
                )?;
                if remainder > 0 {
                    write!(f, ", there will be {}", hanging(remainder))?;
                }
                Ok(())
            }
        }
    }
}

/// "1 student hanging" / "N students hanging".
fn hanging(remainder: usize) -> String {
    if remainder == 1 {
        "1 student hanging".to_string()
    } else {
        format!("{} students hanging", remainder)
    }
}

/// Divide `total_students` into `group_count` groups.
///
/// Feasibility is decided by the floor of `total / groups`: a plan whose
/// smallest group would hold fewer than two students is rejected even when
/// the remainder could top some groups up.
pub fn plan_by_group_count(total_students: usize, group_count: usize) -> Result<GroupPlan, PlanError> {
    if group_count < MIN_GROUP_COUNT {
        return Err(PlanError::TooFewGroups);
    }
    if group_count > total_students {
        return Err(PlanError::CannotDivide {
            students: total_students,
            groups: group_count,
        });
    }

    let students_per_group = total_students / group_count;
    let remainder = total_students % group_count;

    if students_per_group < MIN_GROUP_SIZE {
        return Err(PlanError::CannotManage {
            students: total_students,
            groups: group_count,
        });
    }

    Ok(GroupPlan::ByCount {
        group_count,
        students_per_group,
        remainder,
    })
}

/// Divide `total_students` into groups of `group_size`.
///
/// At least two full groups must be formed.
pub fn plan_by_group_size(total_students: usize, group_size: usize) -> Result<GroupPlan, PlanError> {
    if group_size < MIN_GROUP_SIZE {
        return Err(PlanError::GroupTooSmall);
    }

    let cannot_manage = PlanError::CannotManageGroupsOf {
        students: total_students,
        size: group_size,
    };
    if total_students < group_size {
        return Err(cannot_manage);
    }

    let group_count = total_students / group_size;
    let remainder = total_students % group_size;

    if group_count < MIN_GROUP_COUNT {
        return Err(cannot_manage);
    }

    Ok(GroupPlan::BySize {
        group_size,
        group_count,
        remainder,
    })
}

// =============================================================================
// TESTS
// =============================================================================
