use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        let error_response = json!({
            "success": false,
            "error": self.to_string(),
            "data": serde_json::Value::Null
        });

        (status, Json(error_response)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StorageError::InvalidRequest(_) => ApiError::BadRequest(err.to_string()),
            StorageError::Unavailable(_) => ApiError::ServiceUnavailable(err.to_string()),
            StorageError::Backend(_) => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(err.body_text()),
            status if status.is_client_error() => {
                ApiError::BadRequest(format!("Invalid multipart: {}", err.body_text()))
            }
            _ => ApiError::Internal(format!("Failed to read upload: {}", err.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_map_to_distinct_statuses() {
        let not_found: ApiError = StorageError::NotFound {
            key: "a".to_string(),
            version_id: "v".to_string(),
        }
        .into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let unavailable: ApiError = StorageError::Unavailable("timeout".to_string()).into();
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let backend: ApiError = StorageError::Backend("AccessDenied".to_string()).into();
        assert_eq!(backend.status_code(), StatusCode::BAD_GATEWAY);

        let invalid: ApiError = StorageError::InvalidRequest("bad version".to_string()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_body_uses_envelope() {
        let response = ApiError::NotFound("File 'a' with version 'v' not found".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": "File 'a' with version 'v' not found",
                "data": null
            })
        );
    }
}
