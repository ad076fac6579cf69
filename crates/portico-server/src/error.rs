//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"message": "..."}` with a status taken
//! from the core error kind. Unexpected failures are logged and replaced by a
//! generic message so internals never reach the caller.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use portico_core::Error;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 with the usual "<Entity> not found" wording.
    pub fn not_found(entity: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{entity} not found"))
    }

    /// Map a core error. `action` completes "Failed to ..." for the 500 case.
    pub fn from_core(err: Error, action: &str) -> Self {
        match err {
            Error::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            e @ Error::NotFound(_) => Self::new(StatusCode::NOT_FOUND, e.to_string()),
            Error::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            other => {
                error!("Failed to {}: {}", action, other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to {action}"),
                )
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

/// Body for panics caught by the router's `CatchPanicLayer`.
pub fn panic_response(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    error!("Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Internal server error" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_status() {
        let cases = [
            (Error::validation("Required"), StatusCode::BAD_REQUEST, "Required"),
            (Error::not_found("Cluster"), StatusCode::NOT_FOUND, "Cluster not found"),
            (Error::conflict("dup"), StatusCode::CONFLICT, "dup"),
            (
                Error::Config("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create cluster",
            ),
        ];
        for (err, status, message) in cases {
            let api = ApiError::from_core(err, "create cluster");
            assert_eq!(api.status(), status);
            assert_eq!(api.message(), message);
        }
    }
}
