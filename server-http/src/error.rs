use crate::api::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::Error;

/// Everything a handler can fail with, rendered as a JSON error body
#[derive(Debug)]
pub enum ApiError {
    Cache(Error),
    CacheMiss,
    InvalidPayload(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Cache(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::CacheMiss => StatusCode::NOT_FOUND,
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Cache(Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::CacheMiss => ErrorResponse::new("Cache miss"),
            ApiError::InvalidPayload(reason) => {
                ErrorResponse::new(format!("Invalid JSON payload: {}", reason))
            }
            ApiError::Cache(Error::Backend {
                backend,
                operation,
                source,
                applied,
            }) => ErrorResponse {
                error: format!("Failed to {} on {}: {}", operation, backend, source),
                backend: Some(backend),
                operation: Some(operation.to_string()),
                applied,
            },
            ApiError::Cache(err) => ErrorResponse::new(err.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BackendError, Operation};

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::CacheMiss.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InvalidPayload("missing field".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::InvalidInput("empty key".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::Backend {
                backend: "memcached".into(),
                operation: Operation::Store,
                source: BackendError::Connection("refused".into()),
                applied: vec!["redis".into()],
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
