//! # mmdv-api — Mermaid Validation Service
//!
//! HTTP front end for [`mmdv_core::Validator`]: a caller posts a Mermaid
//! source, the service renders it with the Mermaid CLI, and answers whether
//! rendering succeeded.
//!
//! ## API Surface
//!
//! | Route             | Module                 | Purpose                      |
//! |-------------------|------------------------|------------------------------|
//! | `POST /validate`  | [`routes::validate`]   | Validate one diagram         |
//! | `GET /health`     | [`routes::health`]     | Liveness (no dependency checks) |
//! | `GET /metrics`    | [`app`]                | Prometheus scrape (when enabled) |
//! | `GET /openapi.json` | [`openapi`]          | OpenAPI document             |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → DefaultBodyLimit → Handler
//! ```
//!
//! ## Status Codes
//!
//! 200 valid, 400 missing `code` or rejected diagram, 413 body over the
//! size limit, 500 internal failure.
//! Every `/validate` body carries a `valid` boolean.

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .merge(routes::validate::router())
        .merge(routes::health::router())
        .merge(openapi::router())
        .route("/metrics", axum::routing::get(prometheus_metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /metrics — Prometheus text exposition, 404 when metrics are off.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
