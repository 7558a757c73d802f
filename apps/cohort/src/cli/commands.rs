//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! With the file backend every mutating command writes the roster back to
//! disk before returning; redb commits on each store call.

use crate::api::{self, StudentResponse};
use crate::config::{Backend, Settings};
use chrono::NaiveDate;
use cohort_core::{
    CohortError, SchoolService, StorageBackend, StoreError, Student, StudentId, StudentService,
    StudentStore, average_grade, formats::MAX_ROSTER_FILE_SIZE, mean_grade, roster_from_json,
    roster_to_json,
};
use std::path::Path;

// =============================================================================
// COMMAND INPUTS
// =============================================================================

/// Fields an `update` may change. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl StudentChanges {
    fn apply(self, mut student: Student) -> Student {
        if let Some(first_name) = self.first_name {
            student.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            student.last_name = last_name;
        }
        if let Some(birth_date) = self.birth_date {
            student.birth_date = birth_date;
        }
        student
    }
}

/// Which planner `groups` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRequest {
    Count(usize),
    Size(usize),
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(settings: &Settings) -> Result<(), CohortError> {
    let service = load_service(settings)?;

    println!("Cohort Student Records Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:    {}", settings.bind_addr());
    println!("  Backend:    {}", settings.backend);
    println!("  Database:   {}", settings.database.display());
    println!("  Rate limit: {}/s", settings.rate_limit);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(settings, service).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new, empty database.
pub fn cmd_init(settings: &Settings, force: bool) -> Result<(), CohortError> {
    let path = &settings.database;
    if path.exists() {
        if !force {
            return Err(CohortError::Config(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(path)
            .map_err(|e| CohortError::Io(format!("Remove {}: {}", path.display(), e)))?;
    }

    match settings.backend {
        Backend::Redb => {
            StorageBackend::with_redb(path)?;
        }
        Backend::File => {
            save_service(&StudentService::new(StorageBackend::default()), path)?;
        }
    }

    tracing::info!(database = %path.display(), backend = %settings.backend, "Database initialized");
    println!("Initialized new {} database at {}", settings.backend, path.display());
    Ok(())
}

// =============================================================================
// STUDENT COMMANDS
// =============================================================================

/// List every student.
pub fn cmd_list(settings: &Settings, json_mode: bool) -> Result<(), CohortError> {
    let service = load_service(settings)?;
    let students = service.get_all_students()?;

    if json_mode {
        return print_json(&responses(students));
    }

    if students.is_empty() {
        println!("No students registered.");
        return Ok(());
    }
    print_table(&students);
    Ok(())
}

/// Register a student.
pub fn cmd_add(settings: &Settings, json_mode: bool, student: Student) -> Result<(), CohortError> {
    let mut service = load_service(settings)?;
    let student = service.add_student(student)?;
    save_service(&service, &settings.database)?;

    tracing::info!(student_id = ?student.id, "Student added");
    print_student(student, json_mode)
}

/// Show one student.
pub fn cmd_get(settings: &Settings, json_mode: bool, id: StudentId) -> Result<(), CohortError> {
    let service = load_service(settings)?;
    print_student(service.get_student_by_id(id)?, json_mode)
}

/// Change a student's details. The email and grade are kept.
pub fn cmd_update(
    settings: &Settings,
    json_mode: bool,
    id: StudentId,
    changes: StudentChanges,
) -> Result<(), CohortError> {
    let mut service = load_service(settings)?;
    let current = current_for_update(&service, id)?;
    let student = service.update_student(changes.apply(current))?;
    save_service(&service, &settings.database)?;

    tracing::info!(student_id = id.0, "Student updated");
    print_student(student, json_mode)
}

/// Remove a student.
pub fn cmd_delete(settings: &Settings, json_mode: bool, id: StudentId) -> Result<(), CohortError> {
    let mut service = load_service(settings)?;
    service.delete_student(id)?;
    save_service(&service, &settings.database)?;

    tracing::info!(student_id = id.0, "Student deleted");
    if json_mode {
        print_json(&serde_json::json!({ "deleted": id.0 }))
    } else {
        println!("Deleted student {}", id);
        Ok(())
    }
}

/// Set a student's grade from text.
pub fn cmd_grade(
    settings: &Settings,
    json_mode: bool,
    id: StudentId,
    grade: &str,
) -> Result<(), CohortError> {
    let mut service = load_service(settings)?;
    let student = service.set_grade_for_student_by_id(id, grade)?;
    save_service(&service, &settings.database)?;

    tracing::info!(student_id = id.0, grade = student.grade, "Grade set");
    print_student(student, json_mode)
}

// =============================================================================
// SCHOOL COMMANDS
// =============================================================================

/// Plan groups over the current roster.
pub fn cmd_groups(
    settings: &Settings,
    json_mode: bool,
    request: GroupRequest,
) -> Result<(), CohortError> {
    let service = load_service(settings)?;
    let school = SchoolService::new(&service);
    let message = match request {
        GroupRequest::Count(groups) => {
            school.number_of_students_per_group_when_divided_into_groups(groups)?
        }
        GroupRequest::Size(size) => school.number_of_groups_when_divided_into_groups_of(size)?,
    };
    print_message(&message, json_mode)
}

/// Show the average grade.
pub fn cmd_average(settings: &Settings, json_mode: bool) -> Result<(), CohortError> {
    let service = load_service(settings)?;

    if json_mode {
        let roster = service.get_all_students()?;
        let message = average_grade(&roster)?;
        let average = mean_grade(&roster)?;
        return print_json(&serde_json::json!({
            "average": average,
            "message": message,
        }));
    }

    println!("{}", SchoolService::new(&service).calculate_average_grade()?);
    Ok(())
}

/// Show the top scoring students.
pub fn cmd_top(settings: &Settings, json_mode: bool) -> Result<(), CohortError> {
    let service = load_service(settings)?;
    let top = SchoolService::new(&service).get_top_scoring_students()?;

    if json_mode {
        return print_json(&responses(top));
    }
    print_table(&top);
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the configured backend and wrap it in a service.
///
/// A missing roster file starts an empty in-memory roster.
pub fn load_service(settings: &Settings) -> Result<StudentService<StorageBackend>, CohortError> {
    let path = &settings.database;
    let backend = match settings.backend {
        Backend::Redb => StorageBackend::with_redb(path)?,
        Backend::File if path.exists() => {
            validate_file_size(path, u64::try_from(MAX_ROSTER_FILE_SIZE).unwrap_or(u64::MAX))?;
            let data = std::fs::read(path)
                .map_err(|e| StoreError::Io(format!("Read {}: {}", path.display(), e)))?;
            StorageBackend::InMemory(roster_from_json(&data)?)
        }
        Backend::File => StorageBackend::default(),
    };
    tracing::debug!(database = %path.display(), backend = %settings.backend, "Roster opened");
    Ok(StudentService::new(backend))
}

/// Write an in-memory roster to `path`. Persistent backends are left alone.
pub fn save_service(
    service: &StudentService<StorageBackend>,
    path: &Path,
) -> Result<(), CohortError> {
    let Some(store) = service.store().memory_store() else {
        return Ok(());
    };
    let data = roster_to_json(store)?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &data)
        .map_err(|e| StoreError::Io(format!("Write {}: {}", tmp.display(), e)))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| StoreError::Io(format!("Rename to {}: {}", path.display(), e)))?;
    Ok(())
}

/// Stored record an update starts from. Only a missing student becomes
/// `CannotUpdate`; store failures keep their own class.
fn current_for_update<S: StudentStore>(
    service: &StudentService<S>,
    id: StudentId,
) -> Result<Student, CohortError> {
    match service.get_student_by_id(id) {
        Err(CohortError::StudentNotFound(_)) => Err(CohortError::CannotUpdate(id)),
        other => other,
    }
}

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CohortError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| StoreError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(StoreError::Serialization(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        ))
        .into());
    }
    Ok(())
}

fn responses(students: Vec<Student>) -> Vec<StudentResponse> {
    students.into_iter().map(StudentResponse::from).collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CohortError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn print_message(message: &str, json_mode: bool) -> Result<(), CohortError> {
    if json_mode {
        print_json(&serde_json::json!({ "message": message }))
    } else {
        println!("{}", message);
        Ok(())
    }
}

fn print_student(student: Student, json_mode: bool) -> Result<(), CohortError> {
    if json_mode {
        return print_json(&StudentResponse::from(student));
    }
    print_table(std::slice::from_ref(&student));
    Ok(())
}

fn print_table(students: &[Student]) {
    println!(
        "{:>5}  {:<16} {:<16} {:<10} {:>3}  {:>5}  Email",
        "ID", "First name", "Last name", "Born", "Age", "Grade"
    );
    for s in students {
        println!(
            "{:>5}  {:<16} {:<16} {:<10} {:>3}  {:>5.1}  {}",
            s.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            s.first_name,
            s.last_name,
            s.birth_date,
            s.age(),
            s.grade,
            s.email
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================
