//! # Diagram Validation
//!
//! Routes:
//! - POST /validate — Render a Mermaid source and report whether it is valid

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use mmdv_core::Verdict;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Validation request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidationRequest {
    /// Mermaid diagram source. Required and non-empty.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "graph TD; A-->B")]
    pub code: Option<serde_json::Value>,
}

impl ValidationRequest {
    /// The diagram source, or the error for a missing or unusable `code`.
    ///
    /// Absent, `null`, `""`, `false`, and `0` all count as missing. Any other
    /// non-string value cannot be written as a diagram source and is an
    /// internal error.
    pub fn source(&self) -> Result<&str, AppError> {
        match &self.code {
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => {
                Err(AppError::MissingCode)
            }
            Some(serde_json::Value::String(s)) if s.is_empty() => Err(AppError::MissingCode),
            Some(serde_json::Value::Number(n)) if n.as_f64() == Some(0.0) => {
                Err(AppError::MissingCode)
            }
            Some(serde_json::Value::String(s)) => Ok(s),
            Some(other) => Err(AppError::Internal(format!(
                "Field code must be a string, received {}",
                json_type_name(other)
            ))),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Validation response body, shared by every `/validate` outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationResult {
    /// Whether the renderer accepted the diagram.
    pub valid: bool,
    /// Headline error; `null` when valid.
    pub error: Option<String>,
    /// Full diagnostic text, present on render failures and internal errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ValidationResult {
    /// `{ valid: true, error: null }`.
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
            details: None,
        }
    }

    /// `{ valid: false, error, details? }`.
    pub fn invalid(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            details,
        }
    }
}

impl From<Verdict> for ValidationResult {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Valid => Self::valid(),
            Verdict::Invalid { headline, details } => Self::invalid(headline, Some(details)),
        }
    }
}

/// Build the validation router.
pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(validate))
}

/// POST /validate — Render a Mermaid source and report validity.
#[utoipa::path(
    post,
    path = "/validate",
    request_body = ValidationRequest,
    responses(
        (status = 200, description = "Diagram is valid", body = ValidationResult),
        (status = 400, description = "Missing code or diagram rejected by the renderer", body = ValidationResult),
        (status = 413, description = "Request body over the size limit", body = ValidationResult),
        (status = 500, description = "Internal server error", body = ValidationResult),
    ),
    tag = "validation"
)]
pub async fn validate(
    State(state): State<AppState>,
    body: Result<Json<ValidationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ValidationResult>), AppError> {
    let req = extract_json(body)?;
    let code = req.source()?;

    let verdict = match state.validator.validate(code).await {
        Ok(verdict) => verdict,
        Err(e) => {
            metrics::counter!("mmdv_validations_total", "outcome" => "error").increment(1);
            return Err(e.into());
        }
    };

    let status = if verdict.is_valid() {
        metrics::counter!("mmdv_validations_total", "outcome" => "valid").increment(1);
        StatusCode::OK
    } else {
        metrics::counter!("mmdv_validations_total", "outcome" => "invalid").increment(1);
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(verdict.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> ValidationRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn falsy_code_is_missing() {
        for body in [
            serde_json::json!({}),
            serde_json::json!({ "code": null }),
            serde_json::json!({ "code": "" }),
            serde_json::json!({ "code": false }),
            serde_json::json!({ "code": 0 }),
        ] {
            let err = request(body.clone()).source().unwrap_err();
            assert!(matches!(err, AppError::MissingCode), "{body}: {err:?}");
        }
    }

    #[test]
    fn string_code_is_returned_verbatim() {
        let req = request(serde_json::json!({ "code": "  graph TD; A-->B\n" }));
        assert_eq!(req.source().unwrap(), "  graph TD; A-->B\n");
    }

    #[test]
    fn whitespace_only_code_is_not_missing() {
        let req = request(serde_json::json!({ "code": " " }));
        assert_eq!(req.source().unwrap(), " ");
    }

    #[test]
    fn truthy_non_string_code_is_internal_error() {
        for (body, kind) in [
            (serde_json::json!({ "code": 42 }), "number"),
            (serde_json::json!({ "code": true }), "boolean"),
            (serde_json::json!({ "code": ["graph"] }), "array"),
            (serde_json::json!({ "code": { "a": 1 } }), "object"),
        ] {
            match request(body.clone()).source().unwrap_err() {
                AppError::Internal(msg) => {
                    assert_eq!(msg, format!("Field code must be a string, received {kind}"))
                }
                other => panic!("{body}: expected Internal, got: {other:?}"),
            }
        }
    }

    #[test]
    fn valid_result_serializes_error_as_null() {
        let json = serde_json::to_value(ValidationResult::valid()).unwrap();
        assert_eq!(json, serde_json::json!({ "valid": true, "error": null }));
    }

    #[test]
    fn invalid_verdict_carries_headline_and_details() {
        let result = ValidationResult::from(Verdict::Invalid {
            headline: "Error: Parse error on line 1:".to_string(),
            details: "Error: Parse error on line 1:\n^".to_string(),
        });
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "valid": false,
                "error": "Error: Parse error on line 1:",
                "details": "Error: Parse error on line 1:\n^",
            })
        );
    }
}
