//! # Storage Backend
//!
//! Runtime choice between the volatile and the persistent store.
//!
//! - `InMemory`: `MemoryStore` (fast, volatile unless explicitly saved)
//! - `Persistent`: `RedbStore` for disk-backed ACID storage

use crate::storage::RedbStore;
use crate::store::{MemoryStore, StudentStore};
use crate::types::{StoreError, Student, StudentId};
use std::path::Path;

/// Storage backend selected at startup.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory roster.
    InMemory(MemoryStore),
    /// Disk-backed roster using redb.
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

// NOTE: StorageBackend does NOT implement Clone.
// The redb database handle cannot be shared by copy.

impl StorageBackend {
    /// Open or create a redb database at the given path.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::Persistent(RedbStore::open(path)?))
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }

    /// The in-memory store, `None` for persistent backends.
    #[must_use]
    pub fn memory_store(&self) -> Option<&MemoryStore> {
        match self {
            Self::InMemory(store) => Some(store),
            Self::Persistent(_) => None,
        }
    }
}

impl StudentStore for StorageBackend {
    fn get_all_students(&self) -> Result<Vec<Student>, StoreError> {
        match self {
            Self::InMemory(s) => s.get_all_students(),
            Self::Persistent(s) => s.get_all_students(),
        }
    }

    fn save(&mut self, student: Student) -> Result<Student, StoreError> {
        match self {
            Self::InMemory(s) => s.save(student),
            Self::Persistent(s) => s.save(student),
        }
    }

    fn exists_by_id(&self, id: StudentId) -> Result<bool, StoreError> {
        match self {
            Self::InMemory(s) => s.exists_by_id(id),
            Self::Persistent(s) => s.exists_by_id(id),
        }
    }

    fn delete_by_id(&mut self, id: StudentId) -> Result<(), StoreError> {
        match self {
            Self::InMemory(s) => s.delete_by_id(id),
            Self::Persistent(s) => s.delete_by_id(id),
        }
    }

    fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        match self {
            Self::InMemory(s) => s.find_by_id(id),
            Self::Persistent(s) => s.find_by_id(id),
        }
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        match self {
            Self::InMemory(s) => s.exists_by_email(email),
            Self::Persistent(s) => s.exists_by_email(email),
        }
    }

    fn count(&self) -> Result<usize, StoreError> {
        match self {
            Self::InMemory(s) => s.count(),
            Self::Persistent(s) => s.count(),
        }
    }
}
