//! HTTP error response handling for the API
//!
//! Conversions from domain errors to HTTP responses with the right status
//! codes and JSON error bodies.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Implement IntoResponse for Error so handlers can return `Result<_, Error>`
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// Implement IntoResponse for ApiError for explicit error responses
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // A bare ApiError carries no status of its own; errors normally go
        // through Error::into_response which maps one
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
