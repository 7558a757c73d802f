//! # Core Type Definitions
//!
//! This module contains the roster types shared by every cohort component:
//! - Identifiers (`StudentId`)
//! - The student record (`Student`)
//! - Error types (`PlanError`, `AnalyticsError`, `GradeError`, `StoreError`, `CohortError`)
//! - Error classification (`ErrorClass`)
//!
//! Errors carry the literal user-facing message as their `Display` output.

use crate::primitives::{MAX_EMAIL_LENGTH, MAX_GRADE, MAX_NAME_LENGTH, MIN_GRADE, UNSET_GRADE};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a stored student.
///
/// Assigned by the store on first save, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub u64);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// STUDENT
// =============================================================================

/// A student record as held by the store.
///
/// The email is the unique key and never changes once the student is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Store-assigned identifier, `None` until the first save.
    #[serde(default)]
    pub id: Option<StudentId>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    /// Current grade in `[0.0, 5.0]`.
    #[serde(default)]
    pub grade: f64,
}

impl Student {
    /// Create an unsaved, ungraded student.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
            email: email.into(),
            grade: UNSET_GRADE,
        }
    }

    /// Builder-style grade setter.
    #[must_use]
    pub fn with_grade(mut self, grade: f64) -> Self {
        self.grade = grade;
        self
    }

    /// Age in whole years on the given date.
    ///
    /// Returns 0 for dates before the birth date.
    #[must_use]
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        date.years_since(self.birth_date).unwrap_or(0)
    }

    /// Age in whole years today, by the local clock.
    #[must_use]
    pub fn age(&self) -> u32 {
        self.age_on(Local::now().date_naive())
    }

    /// Check name, email and grade before the record reaches the store.
    pub fn validate(&self) -> Result<(), CohortError> {
        if !(MIN_GRADE..=MAX_GRADE).contains(&self.grade) {
            return Err(GradeError::OutOfRange(self.grade).into());
        }

        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.trim().is_empty() {
                return Err(CohortError::InvalidStudent(format!("{} must not be empty", field)));
            }
            if value.len() > MAX_NAME_LENGTH {
                return Err(CohortError::InvalidStudent(format!(
                    "{} exceeds maximum {} bytes",
                    field, MAX_NAME_LENGTH
                )));
            }
        }

        if self.email.len() > MAX_EMAIL_LENGTH {
            return Err(CohortError::InvalidStudent(format!(
                "email exceeds maximum {} bytes",
                MAX_EMAIL_LENGTH
            )));
        }
        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(CohortError::InvalidStudent(format!(
                "email '{}' is not a valid address",
                self.email
            ))),
        }
    }
}

// =============================================================================
// ERROR CLASSIFICATION
// =============================================================================

/// Transport-neutral classification of a failure.
///
/// The service layer maps each class to its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The roster or the addressed student does not exist.
    NotFound,
    /// The supplied grade is not acceptable.
    NotAcceptable,
    /// The request cannot be planned or is malformed.
    BadRequest,
    /// The request collides with existing data.
    Conflict,
    /// The store failed.
    Internal,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Group planning failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("There should be at least two groups")]
    TooFewGroups,

    #[error("Not able to divide {students} students into {groups} groups")]
    CannotDivide { students: usize, groups: usize },

    #[error("Size of group should be at least 2")]
    GroupTooSmall,

    #[error("Not able to manage {groups} groups with {students} students")]
    CannotManage { students: usize, groups: usize },

    #[error("Not able to manage groups of {size} with only {students} students")]
    CannotManageGroupsOf { students: usize, size: usize },
}

/// Grade analytics failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("No students found")]
    NoStudentsFound,
}

/// Grade validation failures. Both kinds share one message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    /// The text is not a decimal number.
    #[error("Valid grades are 0.0 - 5.0")]
    InvalidFormat(String),

    /// The number lies outside `[0.0, 5.0]`.
    #[error("Valid grades are 0.0 - 5.0")]
    OutOfRange(f64),
}

/// Failures raised by a `StudentStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors surfaced by the student and school services.
///
/// - No silent failures
/// - Every variant is recoverable; nothing here terminates the process
#[derive(Debug, Error)]
pub enum CohortError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Grade(#[from] GradeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Email {0} already exists")]
    EmailAlreadyExists(String),

    #[error("Could not find and delete student by id {0}")]
    CannotDelete(StudentId),

    #[error("Could not find and update student by id {0}")]
    CannotUpdate(StudentId),

    #[error("Could not find student by id {0}")]
    StudentNotFound(StudentId),

    #[error("Could not find and update grades for student by id {0}")]
    CannotUpdateGrade(StudentId),

    #[error("Student id is required")]
    MissingId,

    #[error("Invalid student: {0}")]
    InvalidStudent(String),

    /// Startup configuration could not be read or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CohortError {
    /// Classify this error for the transport layer.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Plan(_) | Self::MissingId | Self::InvalidStudent(_) => ErrorClass::BadRequest,
            Self::Analytics(_)
            | Self::CannotDelete(_)
            | Self::CannotUpdate(_)
            | Self::StudentNotFound(_)
            | Self::CannotUpdateGrade(_) => ErrorClass::NotFound,
            Self::Grade(_) => ErrorClass::NotAcceptable,
            Self::EmailAlreadyExists(_) => ErrorClass::Conflict,
            Self::Store(_) | Self::Config(_) | Self::Io(_) => ErrorClass::Internal,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
