use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache: &'static str,
}

/// Liveness of the API itself. A down cache degrades the service but does not
/// make it unhealthy, so the status stays 200.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = if state.cache.is_available().await {
        "available"
    } else {
        "unavailable"
    };

    Json(HealthResponse {
        status: "ok",
        cache,
    })
}
