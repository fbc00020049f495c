use crate::api::{GetResponse, PutRequest, StatusResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use shared::{Error, TtlMs};
use tracing::info;
use twincache::CacheOperations;

/// GET /cache/{key}
pub async fn get_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>, ApiError> {
    info!("GET: key={}", key);

    let result = state.coordinator.lookup(&key).await?;
    match (result.value, result.source) {
        (Some(value), Some(source)) => Ok(Json(GetResponse { key, value, source })),
        _ => Err(ApiError::CacheMiss),
    }
}

/// POST /cache/{key}
pub async fn put_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<PutRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidPayload(e.body_text()))?;

    if let Some(body_key) = req.key.as_deref() {
        if body_key != key {
            return Err(Error::InvalidInput(format!(
                "body key '{}' does not match path key '{}'",
                body_key, key
            ))
            .into());
        }
    }

    info!("POST: key={}, ttl_ms={}", key, req.ttl_ms);

    let ttl = TtlMs(req.ttl_ms).non_zero();
    let result = state.coordinator.store(&key, &req.value, ttl).await?;
    Ok(Json(StatusResponse::ok(result.backends)))
}

/// DELETE /cache/{key}
pub async fn delete_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    info!("DELETE: key={}", key);

    let result = state.coordinator.remove(&key).await?;
    Ok(Json(StatusResponse::ok(result.backends)))
}

// `/cache/clear` is a static route, so `clear` as a key is routed here for
// every method except PUT
const CLEAR_KEY: &str = "clear";

/// GET /cache/clear
pub async fn get_clear_key(state: State<AppState>) -> Result<Json<GetResponse>, ApiError> {
    get_value(state, Path(CLEAR_KEY.to_string())).await
}

/// POST /cache/clear
pub async fn put_clear_key(
    state: State<AppState>,
    payload: Result<Json<PutRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    put_value(state, Path(CLEAR_KEY.to_string()), payload).await
}

/// DELETE /cache/clear
pub async fn delete_clear_key(state: State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    delete_value(state, Path(CLEAR_KEY.to_string())).await
}
