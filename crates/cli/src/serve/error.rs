//! Mapping from lifecycle errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use checkin_core::LifecycleError;

use super::json_error;

/// Anything a handler can fail with.
#[derive(Debug)]
pub(crate) enum ApiError {
    /// Malformed request framing (bad JSON, bad multipart).
    BadRequest(String),
    Lifecycle(LifecycleError),
}

impl From<LifecycleError> for ApiError {
    fn from(e: LifecycleError) -> Self {
        ApiError::Lifecycle(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let e = match self {
            ApiError::BadRequest(msg) => {
                return json_error(StatusCode::BAD_REQUEST, &msg).into_response()
            }
            ApiError::Lifecycle(e) => e,
        };

        match e {
            LifecycleError::Validation(msg) => {
                json_error(StatusCode::BAD_REQUEST, &msg).into_response()
            }
            LifecycleError::NotFound { id } => json_error(
                StatusCode::NOT_FOUND,
                &format!("entry '{}' not found", id),
            )
            .into_response(),
            LifecycleError::NotImplemented {
                id,
                status,
                message,
            } => {
                let body = serde_json::json!({
                    "error": message,
                    "id": id,
                    "status": status,
                });
                (StatusCode::NOT_IMPLEMENTED, Json(body)).into_response()
            }
            other @ (LifecycleError::Upload { .. } | LifecycleError::Storage(_)) => {
                tracing::error!(error = %other, "request failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                    .into_response()
            }
        }
    }
}
