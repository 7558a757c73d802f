//! # Middleware Module
//!
//! Global request throttling for the cohort HTTP API.
//!
//! The limit comes from the resolved settings (`COHORT_RATE_LIMIT`, the
//! config file, or the default of 100 requests per second). A limit of 0
//! turns throttling off.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::types::ErrorResponse;

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Shared, unkeyed limiter applied to every route.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build a limiter allowing `requests_per_second`, or `None` when it is 0.
pub fn create_rate_limiter(requests_per_second: u32) -> Option<GlobalRateLimiter> {
    let rps = NonZeroU32::new(requests_per_second)?;
    Some(Arc::new(RateLimiter::direct(Quota::per_second(rps))))
}

/// Reject the request with 429 once the quota for this second is spent.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_ok() {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse {
            error: "Too Many Requests".to_string(),
        }),
    )
        .into_response()
}

// =============================================================================
// TESTS
// =============================================================================
