//! Rendering of domain errors as JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use stockbook_shared::AppError;

/// Renders an error as `{"error": code, "message": text, "retryable": bool}`.
///
/// `code` is the domain error code (e.g. `INSUFFICIENT_STOCK`); the status
/// comes from the `AppError` the domain error maps to. Server errors are
/// logged and their message is not echoed to the client.
pub fn error_response(code: &'static str, err: impl Into<AppError>) -> Response {
    let err: AppError = err.into();
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if status.is_server_error() {
        tracing::error!(error = %err, code, "Request failed");
        "An error occurred".to_string()
    } else {
        tracing::debug!(error = %err, code, "Request rejected");
        err.to_string()
    };

    (
        status,
        Json(json!({
            "error": code,
            "message": message,
            "retryable": err.is_retryable(),
        })),
    )
        .into_response()
}

/// Shorthand for a 400 with a fixed code.
pub fn bad_request(code: &'static str, message: impl Into<String>) -> Response {
    error_response(code, AppError::Validation(message.into()))
}
