use crate::api::StatusResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, Json};
use tracing::info;
use twincache::AdminOperations;

/// PUT /cache/clear
pub async fn clear_all(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    info!("Clearing all caches");

    let result = state.coordinator.clear_all().await?;
    Ok(Json(StatusResponse::ok(result.backends)))
}
