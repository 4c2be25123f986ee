//! # Application Error
//!
//! Maps request and infrastructure failures to HTTP responses.
//!
//! Every error body has the same shape as a validation result
//! (`{ valid: false, error, details? }`), so clients only ever parse one
//! response type from `/validate`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::routes::validate::ValidationResult;

/// Message returned when `code` is absent or falsy.
pub const MISSING_CODE_MESSAGE: &str = "Missing required field: code";

/// Headline returned for every 500.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// `code` was absent, null, empty, or otherwise falsy (400).
    #[error("Missing required field: code")]
    MissingCode,

    /// The request body could not be interpreted (400).
    #[error("{0}")]
    BadRequest(String),

    /// The request body exceeded the configured size limit (413).
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The service failed while preparing or running a validation (500).
    ///
    /// The message is returned in `details`.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCode | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<mmdv_core::ValidatorError> for AppError {
    fn from(err: mmdv_core::ValidatorError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::MissingCode => ValidationResult::invalid(MISSING_CODE_MESSAGE, None),
            Self::BadRequest(msg) | Self::PayloadTooLarge(msg) => {
                ValidationResult::invalid(msg, None)
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "validation failed internally");
                ValidationResult::invalid(INTERNAL_ERROR_MESSAGE, Some(msg))
            }
        };
        (status, Json(body)).into_response()
    }
}
