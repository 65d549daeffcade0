//! Health handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//!
//! There is no readiness probe: the store is reached with per-request
//! credentials, so there is no ambient connection to check ahead of time.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /healthz`
///
/// Very small liveness probe that always returns 200 OK with a plain JSON
/// body. This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}
