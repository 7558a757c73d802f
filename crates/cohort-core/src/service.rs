//! # Services
//!
//! Thin orchestration over a `StudentStore`.
//!
//! - `StudentService`: CRUD plus grade assignment
//! - `SchoolService`: fetches the current roster and hands it to the
//!   planner or the analytics
//!
//! Every failure is a classified `CohortError`; mapping classes to
//! transport status codes is left to the caller.

use crate::analytics::{average_grade, top_scoring_students};
use crate::grade::parse_grade;
use crate::planner::{plan_by_group_count, plan_by_group_size};
use crate::primitives::{MIN_GROUP_COUNT, MIN_GROUP_SIZE};
use crate::store::StudentStore;
use crate::types::{CohortError, PlanError, Student, StudentId};

// =============================================================================
// STUDENT SERVICE
// =============================================================================

/// Student CRUD on top of a store.
#[derive(Debug, Default)]
pub struct StudentService<S> {
    store: S,
}

impl<S: StudentStore> StudentService<S> {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrow the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Register a new student. The email must not be taken.
    pub fn add_student(&mut self, student: Student) -> Result<Student, CohortError> {
        student.validate()?;
        if self.store.exists_by_email(&student.email)? {
            return Err(CohortError::EmailAlreadyExists(student.email));
        }
        Ok(self.store.save(student)?)
    }

    /// Every stored student.
    pub fn get_all_students(&self) -> Result<Vec<Student>, CohortError> {
        Ok(self.store.get_all_students()?)
    }

    /// Remove a stored student.
    pub fn delete_student(&mut self, id: StudentId) -> Result<(), CohortError> {
        if !self.store.exists_by_id(id)? {
            return Err(CohortError::CannotDelete(id));
        }
        Ok(self.store.delete_by_id(id)?)
    }

    /// Replace a stored student's details.
    ///
    /// The email is immutable: the stored address is kept whatever the
    /// incoming record says.
    pub fn update_student(&mut self, mut student: Student) -> Result<Student, CohortError> {
        let id = student.id.ok_or(CohortError::MissingId)?;
        let existing = self
            .store
            .find_by_id(id)?
            .ok_or(CohortError::CannotUpdate(id))?;

        student.email = existing.email;
        student.validate()?;
        Ok(self.store.save(student)?)
    }

    /// Fetch one student.
    pub fn get_student_by_id(&self, id: StudentId) -> Result<Student, CohortError> {
        self.store
            .find_by_id(id)?
            .ok_or(CohortError::StudentNotFound(id))
    }

    /// Parse `grade` and store it on the student.
    ///
    /// The grade is validated before the student is looked up, so a bad
    /// grade is reported even for an unknown id.
    pub fn set_grade_for_student_by_id(
        &mut self,
        id: StudentId,
        grade: &str,
    ) -> Result<Student, CohortError> {
        let grade = parse_grade(grade)?;
        let mut student = self
            .store
            .find_by_id(id)?
            .ok_or(CohortError::CannotUpdateGrade(id))?;

        student.grade = grade;
        Ok(self.store.save(student)?)
    }
}

// =============================================================================
// SCHOOL SERVICE
// =============================================================================

/// Cohort planning and grade analytics over the current roster.
///
/// The roster is fetched on every call; nothing is cached.
#[derive(Debug)]
pub struct SchoolService<'a, S> {
    students: &'a StudentService<S>,
}

impl<'a, S: StudentStore> SchoolService<'a, S> {
    /// Borrow a student service.
    #[must_use]
    pub fn new(students: &'a StudentService<S>) -> Self {
        Self { students }
    }

    /// Plan `group_count` groups over the whole roster.
    pub fn number_of_students_per_group_when_divided_into_groups(
        &self,
        group_count: usize,
    ) -> Result<String, CohortError> {
        if group_count < MIN_GROUP_COUNT {
            return Err(PlanError::TooFewGroups.into());
        }
        let total = self.students.get_all_students()?.len();
        Ok(plan_by_group_count(total, group_count)?.to_string())
    }

    /// Plan groups of `group_size` over the whole roster.
    pub fn number_of_groups_when_divided_into_groups_of(
        &self,
        group_size: usize,
    ) -> Result<String, CohortError> {
        if group_size < MIN_GROUP_SIZE {
            return Err(PlanError::GroupTooSmall.into());
        }
        let total = self.students.get_all_students()?.len();
        Ok(plan_by_group_size(total, group_size)?.to_string())
    }

    /// "Average grade is {value}" over the whole roster.
    pub fn calculate_average_grade(&self) -> Result<String, CohortError> {
        let roster = self.students.get_all_students()?;
        Ok(average_grade(&roster)?)
    }

    /// The top quarter of the roster by grade, best first.
    pub fn get_top_scoring_students(&self) -> Result<Vec<Student>, CohortError> {
        let roster = self.students.get_all_students()?;
        let top = top_scoring_students(&roster)?;
        Ok(top.into_iter().cloned().collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
