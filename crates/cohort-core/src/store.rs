//! # Student Store
//!
//! The storage collaborator behind the services.
//!
//! This module implements the `StudentStore` trait for the in-memory
//! `MemoryStore`. The redb-backed implementation lives in `storage`.
//! All data structures use `BTreeMap` so listing order is stable.

use crate::types::{StoreError, Student, StudentId};
use std::collections::BTreeMap;

// =============================================================================
// STUDENTSTORE TRAIT
// =============================================================================

/// Persistence operations the services rely on.
///
/// All operations return `Result<T, StoreError>` so in-memory and
/// persistent backends are interchangeable.
pub trait StudentStore {
    /// All stored students, ordered by id.
    fn get_all_students(&self) -> Result<Vec<Student>, StoreError>;

    /// Insert or replace a student.
    ///
    /// A student without an id is assigned the next free one. Returns the
    /// stored record.
    fn save(&mut self, student: Student) -> Result<Student, StoreError>;

    /// Whether a student with this id is stored.
    fn exists_by_id(&self, id: StudentId) -> Result<bool, StoreError>;

    /// Remove a student. Removing an unknown id is a no-op.
    fn delete_by_id(&mut self, id: StudentId) -> Result<(), StoreError>;

    /// Fetch one student.
    fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError>;

    /// Whether any stored student uses this email.
    fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    /// Number of stored students.
    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.get_all_students()?.len())
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Volatile store backed by a `BTreeMap`.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    students: BTreeMap<StudentId, Student>,
    next_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            students: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot.
    ///
    /// `next_id` is raised above the highest stored id if needed.
    #[must_use]
    pub fn from_parts(students: Vec<Student>, next_id: u64) -> Self {
        let mut store = Self {
            students: BTreeMap::new(),
            next_id: next_id.max(1),
        };
        for student in students {
            if let Some(id) = student.id {
                store.next_id = store.next_id.max(id.0.saturating_add(1));
                store.students.insert(id, student);
            }
        }
        store
    }

    /// Id the next new student will receive.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn allocate_id(&mut self) -> StudentId {
        let id = StudentId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }
}

impl StudentStore for MemoryStore {
    fn get_all_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.students.values().cloned().collect())
    }

    fn save(&mut self, mut student: Student) -> Result<Student, StoreError> {
        let id = match student.id {
            Some(id) => {
                self.next_id = self.next_id.max(id.0.saturating_add(1));
                id
            }
            None => self.allocate_id(),
        };
        student.id = Some(id);
        self.students.insert(id, student.clone());
        Ok(student)
    }

    fn exists_by_id(&self, id: StudentId) -> Result<bool, StoreError> {
        Ok(self.students.contains_key(&id))
    }

    fn delete_by_id(&mut self, id: StudentId) -> Result<(), StoreError> {
        self.students.remove(&id);
        Ok(())
    }

    fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.students.get(&id).cloned())
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.students.values().any(|s| s.email == email))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.students.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================
