//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Each handler takes the service lock, calls one service operation, and
//! converts the outcome to JSON. Mutations go through `AppState::mutate`.

use super::{
    AppState,
    types::{
        ApiError, GradeQuery, HealthResponse, MessageResponse, StudentRequest, StudentResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use cohort_core::{CohortError, SchoolService, StudentId, primitives::UNSET_GRADE};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STUDENT HANDLERS
// =============================================================================

/// List every student.
pub async fn list_students_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let service = state.service.read().await;
    let students = service.get_all_students()?;
    Ok(Json(students.into_iter().map(StudentResponse::from).collect()))
}

/// Register a student.
pub async fn add_student_handler(
    State(state): State<AppState>,
    Json(request): Json<StudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    let student = state
        .mutate(|service| service.add_student(request.into_student()))
        .await?;

    tracing::info!(student_id = ?student.id, "Student added");
    Ok((StatusCode::CREATED, Json(student.into())))
}

/// Fetch one student.
pub async fn get_student_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<StudentResponse>, ApiError> {
    let service = state.service.read().await;
    let student = service.get_student_by_id(StudentId(id))?;
    Ok(Json(student.into()))
}

/// Replace a student's details. The grade and email are kept.
pub async fn update_student_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<StudentRequest>,
) -> Result<Json<StudentResponse>, ApiError> {
    let id = StudentId(id);
    let student = state
        .mutate(|service| {
            // Unknown ids fall through to the service's "could not find and update" error.
            let grade = match service.get_student_by_id(id) {
                Ok(current) => current.grade,
                Err(CohortError::StudentNotFound(_)) => UNSET_GRADE,
                Err(e) => return Err(e),
            };
            service.update_student(request.into_update(id, grade))
        })
        .await?;

    tracing::info!(student_id = id.0, "Student updated");
    Ok(Json(student.into()))
}

/// Remove a student.
pub async fn delete_student_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .mutate(|service| service.delete_student(StudentId(id)))
        .await?;

    tracing::info!(student_id = id, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Set a student's grade from text.
pub async fn set_grade_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<GradeQuery>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = state
        .mutate(|service| service.set_grade_for_student_by_id(StudentId(id), &query.grade))
        .await?;

    tracing::info!(student_id = id, grade = student.grade, "Grade set");
    Ok(Json(student.into()))
}

// =============================================================================
// SCHOOL HANDLERS
// =============================================================================

/// Plan a fixed number of groups.
pub async fn groups_by_count_handler(
    State(state): State<AppState>,
    Path(groups): Path<usize>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = state.service.read().await;
    let message =
        SchoolService::new(&service).number_of_students_per_group_when_divided_into_groups(groups)?;
    Ok(Json(MessageResponse::new(message)))
}

/// Plan groups of a fixed size.
pub async fn groups_by_size_handler(
    State(state): State<AppState>,
    Path(size): Path<usize>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = state.service.read().await;
    let message = SchoolService::new(&service).number_of_groups_when_divided_into_groups_of(size)?;
    Ok(Json(MessageResponse::new(message)))
}

/// Average grade over the roster.
pub async fn average_grade_handler(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = state.service.read().await;
    let message = SchoolService::new(&service).calculate_average_grade()?;
    Ok(Json(MessageResponse::new(message)))
}

/// Top quarter of the roster by grade.
pub async fn top_students_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let service = state.service.read().await;
    let top = SchoolService::new(&service).get_top_scoring_students()?;
    Ok(Json(top.into_iter().map(StudentResponse::from).collect()))
}
