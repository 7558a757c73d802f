//! # Roster File Format
//!
//! JSON snapshot of a `MemoryStore`, used by the file backend.
//!
//! File I/O operations are in the app layer; this module only converts
//! between bytes and stores.
//!
//! Layout:
//! ```json
//! { "version": 1, "next_id": 4, "students": [ ... ] }
//! ```

use crate::primitives::{MAX_GRADE, MIN_GRADE, ROSTER_FORMAT_VERSION};
use crate::store::{MemoryStore, StudentStore};
use crate::types::{StoreError, Student};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum accepted roster file size.
///
/// Checked before any parsing happens.
pub const MAX_ROSTER_FILE_SIZE: usize = 64 * 1024 * 1024;

/// On-disk shape of a roster snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFile {
    pub version: u8,
    pub next_id: u64,
    pub students: Vec<Student>,
}

impl RosterFile {
    /// Snapshot a store.
    pub fn from_store(store: &MemoryStore) -> Result<Self, StoreError> {
        Ok(Self {
            version: ROSTER_FORMAT_VERSION,
            next_id: store.next_id(),
            students: store.get_all_students()?,
        })
    }

    /// Check the snapshot before it is trusted.
    ///
    /// Every student needs a unique id, a unique email and a grade in
    /// `[0.0, 5.0]`.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.version != ROSTER_FORMAT_VERSION {
            return Err(StoreError::Serialization(format!(
                "Unsupported roster version: {} (expected {})",
                self.version, ROSTER_FORMAT_VERSION
            )));
        }

        let mut ids = BTreeSet::new();
        let mut emails = BTreeSet::new();
        for student in &self.students {
            let Some(id) = student.id else {
                return Err(StoreError::Serialization(
                    "Roster contains a student without an id".to_string(),
                ));
            };
            if !ids.insert(id) {
                return Err(StoreError::Serialization(format!(
                    "Roster contains student id {} more than once",
                    id
                )));
            }
            if !emails.insert(student.email.as_str()) {
                return Err(StoreError::Serialization(format!(
                    "Roster contains email {} more than once",
                    student.email
                )));
            }
            if !(MIN_GRADE..=MAX_GRADE).contains(&student.grade) {
                return Err(StoreError::Serialization(format!(
                    "Student {} has grade {} outside {} - {}",
                    id, student.grade, MIN_GRADE, MAX_GRADE
                )));
            }
        }
        Ok(())
    }

    /// Rebuild the in-memory store.
    #[must_use]
    pub fn into_store(self) -> MemoryStore {
        MemoryStore::from_parts(self.students, self.next_id)
    }
}

/// Serialize a store as pretty-printed JSON.
pub fn roster_to_json(store: &MemoryStore) -> Result<Vec<u8>, StoreError> {
    let file = RosterFile::from_store(store)?;
    serde_json::to_vec_pretty(&file).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Deserialize a store from JSON bytes.
pub fn roster_from_json(bytes: &[u8]) -> Result<MemoryStore, StoreError> {
    if bytes.len() > MAX_ROSTER_FILE_SIZE {
        return Err(StoreError::Serialization(format!(
            "Roster size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_ROSTER_FILE_SIZE
        )));
    }

    let file: RosterFile = serde_json::from_slice(bytes).map_err(|e| {
        StoreError::Serialization(format!("Failed to parse roster file: {}", e))
    })?;
    file.validate()?;

    Ok(file.into_store())
}

// =============================================================================
// TESTS
// =============================================================================
