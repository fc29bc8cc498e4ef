use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct ValidationResponse {
    detail: String,
}

/// Error returned by handlers as `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

/// Request body that failed to parse as a soil sample.
///
/// Keeps the extractor's status (400, 415 or 422) and reports its reason
/// under `detail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub status: StatusCode,
    pub detail: String,
}

impl From<JsonRejection> for ValidationError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let payload = Json(ValidationResponse {
            detail: self.detail,
        });
        (self.status, payload).into_response()
    }
}
