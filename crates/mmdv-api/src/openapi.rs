//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mermaid Validation Service",
        description = "Validates Mermaid diagram sources by rendering them with the Mermaid CLI.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::validate::validate,
        crate::routes::health::health,
    ),
    components(schemas(
        crate::routes::validate::ValidationRequest,
        crate::routes::validate::ValidationResult,
        crate::routes::health::HealthStatus,
    )),
    tags(
        (name = "validation", description = "Diagram validation"),
        (name = "health", description = "Liveness probe"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
