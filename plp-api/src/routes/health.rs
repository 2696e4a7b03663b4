//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    storage: bool,
}

/// Health check handler
///
/// Probes the trade store with a cheap query so a broken database surfaces
/// here instead of on the first real request.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage_ok = state.trade_storage.trade_exists("health-probe").is_ok();

    let (status, code) = if storage_ok {
        ("healthy", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: status.to_string(),
        storage: storage_ok,
    };

    (code, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
