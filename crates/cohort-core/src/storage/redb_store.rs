//! # redb-backed Student Storage
//!
//! A disk-backed `StudentStore` using the redb embedded database.
//!
//! Every mutation runs in its own write transaction, so a crash never
//! leaves the email index out of step with the student table.
//!
//! Records are serialized with postcard.

use crate::store::StudentStore;
use crate::types::{StoreError, Student, StudentId};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for students: StudentId(u64) -> serialized Student bytes
const STUDENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("students");

/// Table for the unique email key: email -> StudentId(u64)
const EMAIL_INDEX: TableDefinition<&str, u64> = TableDefinition::new("email_index");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_ID_KEY: &str = "next_student_id";

fn io_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Io(e.to_string())
}

fn encode(student: &Student) -> Result<Vec<u8>, StoreError> {
    postcard::to_allocvec(student).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Student, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// A disk-backed student store.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Next id to hand out, mirrored in the metadata table.
    next_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a student database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let _ = write_txn.open_table(EMAIL_INDEX).map_err(io_err)?;
            let _ = write_txn.open_table(METADATA).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        let next_id = {
            let read_txn = db.begin_read().map_err(io_err)?;
            let table = read_txn.open_table(METADATA).map_err(io_err)?;
            table
                .get(NEXT_ID_KEY)
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(1)
        };

        Ok(Self { db, next_id })
    }
}

impl StudentStore for RedbStore {
    fn get_all_students(&self) -> Result<Vec<Student>, StoreError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(io_err)?;

        let mut students = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            students.push(decode(value.value())?);
        }
        Ok(students)
    }

    fn save(&mut self, mut student: Student) -> Result<Student, StoreError> {
        let mut next_id = self.next_id;
        let id = match student.id {
            Some(id) => {
                next_id = next_id.max(id.0.saturating_add(1));
                id
            }
            None => {
                let id = StudentId(next_id);
                next_id = next_id.saturating_add(1);
                id
            }
        };
        student.id = Some(id);
        let bytes = encode(&student)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut students = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let mut emails = write_txn.open_table(EMAIL_INDEX).map_err(io_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;

            let previous = students
                .get(id.0)
                .map_err(io_err)?
                .map(|v| decode(v.value()))
                .transpose()?;
            if let Some(old) = previous
                && old.email != student.email
            {
                emails.remove(old.email.as_str()).map_err(io_err)?;
            }

            students.insert(id.0, bytes.as_slice()).map_err(io_err)?;
            emails.insert(student.email.as_str(), id.0).map_err(io_err)?;
            meta.insert(NEXT_ID_KEY, next_id).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        self.next_id = next_id;
        Ok(student)
    }

    fn exists_by_id(&self, id: StudentId) -> Result<bool, StoreError> {
        Ok(self.find_by_id(id)?.is_some())
    }

    fn delete_by_id(&mut self, id: StudentId) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut students = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let mut emails = write_txn.open_table(EMAIL_INDEX).map_err(io_err)?;

            let removed = students
                .remove(id.0)
                .map_err(io_err)?
                .map(|v| decode(v.value()))
                .transpose()?;
            if let Some(student) = removed {
                emails.remove(student.email.as_str()).map_err(io_err)?;
            }
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(io_err)?;
        table
            .get(id.0)
            .map_err(io_err)?
            .map(|v| decode(v.value()))
            .transpose()
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(EMAIL_INDEX).map_err(io_err)?;
        Ok(table.get(email).map_err(io_err)?.is_some())
    }

    fn count(&self) -> Result<usize, StoreError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(io_err)?;
        let count = table.len().map_err(io_err)?;
        Ok(count as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================
