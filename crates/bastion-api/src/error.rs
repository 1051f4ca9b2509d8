//! # API Error Types
//!
//! Every error leaves the auth service as the standard envelope
//! `{code, message}` with the HTTP status equal to `code`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bastion_auth::AuthFailure;
use bastion_core::ApiResult;
use thiserror::Error;

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Credentials rejected (401). Carries the caller-visible message.
    #[error("{0}")]
    Unauthorized(String),

    /// Unexpected failure (500). Carries a caller-safe message.
    #[error("{0}")]
    Internal(String),

    /// No metrics recorder installed (503).
    #[error("metrics recorder not installed")]
    MetricsUnavailable,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MetricsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }
        let body: ApiResult<()> = ApiResult::fail(status.as_u16(), self.to_string());
        (status, Json(body)).into_response()
    }
}

impl From<AuthFailure> for AppError {
    fn from(err: AuthFailure) -> Self {
        match err.status_code() {
            401 => Self::Unauthorized(err.public_message()),
            _ => Self::Internal(err.public_message()),
        }
    }
}
