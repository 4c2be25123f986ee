//! # Request Extraction
//!
//! Maps JSON body rejections to [`AppError`] so that every failure on
//! `/validate` answers with the validation result shape instead of Axum's
//! plain-text rejection.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppError;

/// Extract a JSON body.
///
/// A request without a JSON content type carries no `code` at all and is
/// reported as [`AppError::MissingCode`]. A body over the size limit keeps
/// its 413. Any other rejection (syntax error, wrong shape) becomes
/// [`AppError::BadRequest`] with Axum's message.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match result {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(AppError::MissingCode),
        Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLarge(err.body_text()))
        }
        Err(err) => Err(AppError::BadRequest(err.body_text())),
    }
}
