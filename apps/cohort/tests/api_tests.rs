//! Integration tests for the cohort HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum_test::TestServer;
use chrono::NaiveDate;
use cohort::api::{
    AppState, ErrorResponse, HealthResponse, MessageResponse, StudentRequest, StudentResponse,
    create_router,
};
use cohort_core::{StorageBackend, StudentService, roster_from_json};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn request(first: &str, last: &str, email: &str) -> StudentRequest {
    StudentRequest {
        first_name: first.to_string(),
        last_name: last.to_string(),
        birth_date: NaiveDate::from_ymd_opt(2007, 4, 23).unwrap(),
        email: email.to_string(),
    }
}

/// Create a test server over an empty in-memory roster.
fn create_test_server() -> TestServer {
    let state = AppState::new(StudentService::new(StorageBackend::default())).with_rate_limit(0);
    TestServer::new(create_router(state)).unwrap()
}

/// Create a test server holding the eight-student class, graded.
async fn create_class_server() -> TestServer {
    let server = create_test_server();
    let class = [
        ("Malin", "Olsson", "malinolsson@gmail.com", "2.5"),
        ("Kevin", "Andersson", "kevinandersson@gmail.com", "4.5"),
        ("Gertrud", "Anks", "gertrudands@gmail.com", "1.2"),
        ("Lisa", "Svan", "lisasvan@gmail.com", "3.7"),
        ("Tom", "Anks", "tomanks@gmail.com", "2.3"),
        ("Ed", "Olsson", "ed@gmail.com", "5.0"),
        ("Edd", "Andersson", "edd@gmail.com", "4.9"),
        ("Eddy", "Jonsson", "eddy@gmail.com", "2.8"),
    ];

    for (first, last, email, grade) in class {
        let created: StudentResponse = server
            .post("/students")
            .json(&request(first, last, email))
            .await
            .json();
        server
            .patch(&format!("/students/{}/grade", created.id))
            .add_query_param("grade", grade)
            .await
            .assert_status_ok();
    }
    server
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// STUDENT ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_add_student_assigns_id() {
    let server = create_test_server();

    let response = server
        .post("/students")
        .json(&request("Kevin", "Andersson", "kevinandersson@gmail.com"))
        .await;

    assert_eq!(response.status_code().as_u16(), 201);
    let student: StudentResponse = response.json();
    assert_eq!(student.id, 1);
    assert_eq!(student.grade, 0.0);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let server = create_test_server();
    let kevin = request("Kevin", "Andersson", "kevinandersson@gmail.com");
    server.post("/students").json(&kevin).await;

    let response = server.post("/students").json(&kevin).await;

    assert_eq!(response.status_code().as_u16(), 409);
    let error: ErrorResponse = response.json();
    assert_eq!(error.error, "Email kevinandersson@gmail.com already exists");
}

#[tokio::test]
async fn test_invalid_student_is_bad_request() {
    let server = create_test_server();

    let response = server
        .post("/students")
        .json(&request("Kevin", "Andersson", "not-an-email"))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_list_students() {
    let server = create_class_server().await;

    let students: Vec<StudentResponse> = server.get("/students").await.json();

    assert_eq!(students.len(), 8);
    assert_eq!(students[0].first_name, "Malin");
}

#[tokio::test]
async fn test_get_unknown_student() {
    let server = create_test_server();

    let response = server.get("/students/10").await;

    response.assert_status_not_found();
    let error: ErrorResponse = response.json();
    assert_eq!(error.error, "Could not find student by id 10");
}

#[tokio::test]
async fn test_update_keeps_email_and_grade() {
    let server = create_class_server().await;

    let response = server
        .put("/students/2")
        .json(&request("Kev", "Andersson", "other@gmail.com"))
        .await;

    response.assert_status_ok();
    let student: StudentResponse = response.json();
    assert_eq!(student.first_name, "Kev");
    assert_eq!(student.email, "kevinandersson@gmail.com");
    assert_eq!(student.grade, 4.5);
}

#[tokio::test]
async fn test_update_unknown_student() {
    let server = create_test_server();

    let response = server
        .put("/students/10")
        .json(&request("Kev", "Andersson", "kev@gmail.com"))
        .await;

    response.assert_status_not_found();
    let error: ErrorResponse = response.json();
    assert_eq!(error.error, "Could not find and update student by id 10");
}

#[tokio::test]
async fn test_delete_student() {
    let server = create_class_server().await;

    server.delete("/students/1").await.assert_status(axum::http::StatusCode::NO_CONTENT);
    server.get("/students/1").await.assert_status_not_found();

    let response = server.delete("/students/1").await;
    response.assert_status_not_found();
    let error: ErrorResponse = response.json();
    assert_eq!(error.error, "Could not find and delete student by id 1");
}

// =============================================================================
// GRADE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_set_grade_trims_input() {
    let server = create_class_server().await;

    let response = server
        .patch("/students/3/grade")
        .add_query_param("grade", " 3.5 ")
        .await;

    response.assert_status_ok();
    let student: StudentResponse = response.json();
    assert_eq!(student.grade, 3.5);
}

#[tokio::test]
async fn test_invalid_grade_not_acceptable() {
    let server = create_class_server().await;

    for grade in ["5.1", "-0.1", "abc", "NaN"] {
        let response = server
            .patch("/students/1/grade")
            .add_query_param("grade", grade)
            .await;

        assert_eq!(response.status_code().as_u16(), 406, "grade {grade:?}");
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "Valid grades are 0.0 - 5.0");
    }
}

#[tokio::test]
async fn test_grade_checked_before_student_lookup() {
    let server = create_test_server();

    let invalid = server
        .patch("/students/10/grade")
        .add_query_param("grade", "9")
        .await;
    assert_eq!(invalid.status_code().as_u16(), 406);

    let valid = server
        .patch("/students/10/grade")
        .add_query_param("grade", "4.0")
        .await;
    valid.assert_status_not_found();
    let error: ErrorResponse = valid.json();
    assert_eq!(
        error.error,
        "Could not find and update grades for student by id 10"
    );
}

// =============================================================================
// SCHOOL ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_groups_by_count() {
    let server = create_class_server().await;

    let response = server.get("/school/groups/count/3").await;

    response.assert_status_ok();
    let message: MessageResponse = response.json();
    assert_eq!(
        message.message,
        "3 groups could be formed with 2 students per group, but that would leave 2 students hanging"
    );
}

#[tokio::test]
async fn test_groups_by_size() {
    let server = create_class_server().await;

    let message: MessageResponse = server.get("/school/groups/size/4").await.json();

    assert_eq!(
        message.message,
        "4 students per group is possible, there will be 2 groups"
    );
}

#[tokio::test]
async fn test_planning_errors_are_bad_requests() {
    let server = create_class_server().await;

    let cases = [
        ("/school/groups/count/1", "There should be at least two groups"),
        ("/school/groups/count/9", "Not able to divide 8 students into 9 groups"),
        ("/school/groups/count/5", "Not able to manage 5 groups with 8 students"),
        ("/school/groups/size/1", "Size of group should be at least 2"),
        ("/school/groups/size/5", "Not able to manage groups of 5 with only 8 students"),
    ];

    for (path, expected) in cases {
        let response = server.get(path).await;
        response.assert_status_bad_request();
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, expected, "{path}");
    }
}

#[tokio::test]
async fn test_average_grade() {
    let server = create_class_server().await;

    let message: MessageResponse = server.get("/school/average").await.json();

    assert_eq!(message.message, "Average grade is 3.4");
}

#[tokio::test]
async fn test_empty_roster_has_no_analytics() {
    let server = create_test_server();

    for path in ["/school/average", "/school/top"] {
        let response = server.get(path).await;
        response.assert_status_not_found();
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "No students found");
    }
}

#[tokio::test]
async fn test_top_students() {
    let server = create_class_server().await;

    let top: Vec<StudentResponse> = server.get("/school/top").await.json();

    let names: Vec<&str> = top.iter().map(|s| s.first_name.as_str()).collect();
    assert_eq!(names, vec!["Ed", "Edd"]);
}

// =============================================================================
// PERSISTENCE TESTS
// =============================================================================

#[tokio::test]
async fn test_snapshot_written_after_mutation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roster.json");
    let state = AppState::new(StudentService::new(StorageBackend::default()))
        .with_rate_limit(0)
        .with_snapshot(path.clone());
    let server = TestServer::new(create_router(state)).unwrap();

    server
        .post("/students")
        .json(&request("Kevin", "Andersson", "kevinandersson@gmail.com"))
        .await;

    let store = roster_from_json(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(store.next_id(), 2);
}

/// Server whose snapshot directory does not exist, so every write fails.
fn create_unwritable_server(dir: &TempDir, service: StudentService<StorageBackend>) -> TestServer {
    let path = dir.path().join("missing").join("roster.json");
    let state = AppState::new(service)
        .with_rate_limit(0)
        .with_snapshot(path);
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_failed_snapshot_rolls_back_add() {
    let dir = TempDir::new().unwrap();
    let server = create_unwritable_server(&dir, StudentService::new(StorageBackend::default()));

    let response = server
        .post("/students")
        .json(&request("Kevin", "Andersson", "kevinandersson@gmail.com"))
        .await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    let students: Vec<StudentResponse> = server.get("/students").await.json();
    assert!(students.is_empty());

    // Retrying fails the same way instead of hitting the duplicate email check.
    server
        .post("/students")
        .json(&request("Kevin", "Andersson", "kevinandersson@gmail.com"))
        .await
        .assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_failed_snapshot_rolls_back_grade() {
    let dir = TempDir::new().unwrap();
    let mut service = StudentService::new(StorageBackend::default());
    service
        .add_student(request("Malin", "Olsson", "malinolsson@gmail.com").into_student())
        .unwrap();
    let server = create_unwritable_server(&dir, service);

    server
        .patch("/students/1/grade")
        .add_query_param("grade", "4.5")
        .await
        .assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    let student: StudentResponse = server.get("/students/1").await.json();
    assert_eq!(student.grade, 0.0);

    server
        .delete("/students/1")
        .await
        .assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    server.get("/students/1").await.assert_status_ok();
}

// =============================================================================
// ERROR HANDLING TESTS
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let server = create_test_server();

    server.get("/unknown").await.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = create_test_server();

    let response = server.post("/health").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = create_test_server();

    let response = server
        .post("/students")
        .json(&json!({ "first_name": "Kevin" }))
        .await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let state = AppState::new(StudentService::new(StorageBackend::default())).with_rate_limit(1);
    let server = TestServer::new(create_router(state)).unwrap();

    server.get("/health").await.assert_status_ok();
    let response = server.get("/health").await;
    assert_eq!(response.status_code().as_u16(), 429);
}
