//! # Cohort HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /students` - List students
//! - `POST /students` - Register a student
//! - `GET /students/{id}` - Fetch a student
//! - `PUT /students/{id}` - Update a student's details
//! - `DELETE /students/{id}` - Remove a student
//! - `PATCH /students/{id}/grade?grade=<text>` - Set a grade
//! - `GET /school/groups/count/{groups}` - Plan a number of groups
//! - `GET /school/groups/size/{size}` - Plan groups of a size
//! - `GET /school/average` - Average grade
//! - `GET /school/top` - Top scoring students
//!
//! ## Configuration (Environment Variables)
//!
//! - `COHORT_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `COHORT_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    ApiError, ErrorResponse, GradeQuery, HealthResponse, MessageResponse, StudentRequest,
    StudentResponse, status_for,
};

use crate::cli::save_service;
use crate::config::{DEFAULT_RATE_LIMIT, Settings};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, patch},
};
use cohort_core::{CohortError, StorageBackend, StudentService};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
const MAX_BODY_SIZE: usize = 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the student service.
#[derive(Clone)]
pub struct AppState {
    /// The student service over the configured backend.
    pub service: Arc<RwLock<StudentService<StorageBackend>>>,
    /// Roster file rewritten after each mutation (file backend only).
    pub snapshot: Option<PathBuf>,
    /// Requests per second, 0 for unlimited.
    pub rate_limit: u32,
}

impl AppState {
    /// Create new app state around a service.
    #[must_use]
    pub fn new(service: StudentService<StorageBackend>) -> Self {
        Self {
            service: Arc::new(RwLock::new(service)),
            snapshot: None,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }

    /// Write the roster to `path` after every mutation.
    #[must_use]
    pub fn with_snapshot(mut self, path: PathBuf) -> Self {
        self.snapshot = Some(path);
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: u32) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Run a mutating service call under the write lock.
    ///
    /// With a snapshot configured, the roster is written after the call and
    /// the in-memory store is rolled back if that write fails.
    pub async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut StudentService<StorageBackend>) -> Result<T, CohortError>,
    ) -> Result<T, CohortError> {
        let mut service = self.service.write().await;
        let Some(path) = &self.snapshot else {
            return op(&mut *service);
        };

        let backup = service.store().memory_store().cloned();
        let value = op(&mut *service)?;
        if let Err(e) = save_service(&service, path) {
            if let Some(store) = backup {
                *service.store_mut() = StorageBackend::InMemory(store);
            }
            tracing::error!(snapshot = %path.display(), error = %e, "Snapshot write failed, change rolled back");
            return Err(e);
        }
        Ok(value)
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `COHORT_CORS_ORIGINS`.
///
/// - `*`: any origin
/// - unset or no valid entries: localhost only
/// - otherwise: the comma-separated origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("COHORT_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (COHORT_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!(origin, "CORS: Allowing origin");
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!(origin, error = %e, "CORS: Invalid origin");
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins in COHORT_CORS_ORIGINS, using localhost");
                build_localhost_cors()
            } else {
                cors_for(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    cors_for(origins)
}

fn cors_for(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate limiting (if enabled)
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/students",
            get(handlers::list_students_handler).post(handlers::add_student_handler),
        )
        .route(
            "/students/{id}",
            get(handlers::get_student_handler)
                .put(handlers::update_student_handler)
                .delete(handlers::delete_student_handler),
        )
        .route("/students/{id}/grade", patch(handlers::set_grade_handler))
        .route(
            "/school/groups/count/{groups}",
            get(handlers::groups_by_count_handler),
        )
        .route(
            "/school/groups/size/{size}",
            get(handlers::groups_by_size_handler),
        )
        .route("/school/average", get(handlers::average_grade_handler))
        .route("/school/top", get(handlers::top_students_handler));

    match create_rate_limiter(state.rate_limit) {
        Some(limiter) => {
            tracing::info!(rate_limit = state.rate_limit, "Rate limiting enabled");
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and serve until Ctrl+C.
pub async fn run_server(
    settings: &Settings,
    service: StudentService<StorageBackend>,
) -> Result<(), CohortError> {
    let persistent = service.store().is_persistent();
    let mut state = AppState::new(service).with_rate_limit(settings.rate_limit);
    if !persistent {
        state = state.with_snapshot(settings.database.clone());
    }
    let router = create_router(state);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CohortError::Config(format!("Bind {} failed: {}", addr, e)))?;

    tracing::info!(addr = %addr, backend = %settings.backend, "Cohort HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CohortError::Io(format!("Server error: {}", e)))?;

    tracing::info!("Cohort HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
