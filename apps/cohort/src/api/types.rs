//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API and the
//! mapping from core error classes to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use cohort_core::{CohortError, ErrorClass, Student, StudentId};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STUDENT REQUEST/RESPONSE
// =============================================================================

/// Body of `POST /students` and `PUT /students/{id}`.
///
/// On update the email is ignored; a student's email never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
}

impl StudentRequest {
    /// Build an unsaved student.
    pub fn into_student(self) -> Student {
        Student::new(self.first_name, self.last_name, self.birth_date, self.email)
    }

    /// Build a student addressed by `id`, keeping the stored grade.
    pub fn into_update(self, id: StudentId, grade: f64) -> Student {
        let mut student = self.into_student().with_grade(grade);
        student.id = Some(id);
        student
    }
}

/// A student as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: String,
    pub grade: f64,
    pub age: u32,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        let age = student.age();
        Self {
            id: student.id.map_or(0, |id| id.0),
            first_name: student.first_name,
            last_name: student.last_name,
            birth_date: student.birth_date,
            email: student.email,
            grade: student.grade,
            age,
        }
    }
}

/// Query string of `PATCH /students/{id}/grade`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeQuery {
    pub grade: String,
}

// =============================================================================
// SCHOOL RESPONSES
// =============================================================================

/// Planning or analytics message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body; `error` is the literal core message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP status for a core error class.
pub fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
        ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
        ErrorClass::Conflict => StatusCode::CONFLICT,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A core error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub CohortError);

impl From<CohortError> for ApiError {
    fn from(err: CohortError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.class());
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "Request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
