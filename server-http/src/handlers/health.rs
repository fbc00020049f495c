use crate::api::{BackendHealthResponse, HealthResponse};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use twincache::AdminOperations;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = state.coordinator.health().await;

    let (status_code, status) = if health.is_fully_healthy() {
        (StatusCode::OK, "ok")
    } else if health.is_serving() {
        (StatusCode::OK, "degraded")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "down")
    };

    let backends = health
        .backends
        .into_iter()
        .map(|b| BackendHealthResponse {
            name: b.name,
            healthy: b.healthy,
            error: b.error,
        })
        .collect();

    (status_code, Json(HealthResponse { status, backends }))
}
