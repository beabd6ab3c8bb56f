//! GET /health - liveness probe, always 200.

use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::models::HealthResponse;

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
    })
}
