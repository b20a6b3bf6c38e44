//! API error responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::content::StoreError;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Too many requests")]
    RateLimited { retry_after_secs: u64 },

    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Access denied - email not authorized")]
    Forbidden,

    #[error("Invalid data")]
    ValidationFailed(Vec<String>),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    StorageFault(&'static str),

    #[error("{0}")]
    ServiceUnavailable(&'static str),
}

impl ApiError {
    /// Log a store failure and map it to the message for `operation`.
    pub fn storage(operation: &'static str, err: StoreError) -> Self {
        tracing::error!(operation, error = %err, "Content store operation failed");
        metrics::record_content_operation(operation, false);
        ApiError::StorageFault(match operation {
            "update" => "Failed to update portfolio data",
            "clear" => "Failed to clear portfolio data",
            _ => "Failed to fetch portfolio data",
        })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::ValidationFailed(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::StorageFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::RateLimited { retry_after_secs } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(json!({ "error": "Too many requests" })),
            )
                .into_response(),
            ApiError::ValidationFailed(details) => (
                status,
                Json(json!({ "error": "Invalid data", "details": details })),
            )
                .into_response(),
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}
