//! # Request Metrics
//!
//! HTTP-level counters and latency recorded through the `metrics` facade.
//! When no recorder is installed (tests, `--metrics false`), the macros are
//! no-ops.
//!
//! Domain metrics are recorded where they happen:
//! - `mmdv_validations_total{outcome}` — [`crate::routes::validate`]
//! - `mmdv_render_duration_seconds`, `mmdv_render_timeouts_total` — `mmdv_core::renderer`

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe();
    Ok(handle)
}

fn describe() {
    metrics::describe_counter!("mmdv_http_requests_total", "Total HTTP requests");
    metrics::describe_histogram!(
        "mmdv_http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    metrics::describe_counter!(
        "mmdv_validations_total",
        "Validation outcomes (valid, invalid, error)"
    );
    metrics::describe_histogram!(
        "mmdv_render_duration_seconds",
        metrics::Unit::Seconds,
        "Wall-clock time of one renderer invocation"
    );
    metrics::describe_counter!(
        "mmdv_render_timeouts_total",
        "Renderer invocations killed at the timeout"
    );
}

/// Middleware that records request count and latency per route.
///
/// The path label is the matched route template, so unknown paths collapse
/// into a single `unmatched` series.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "mmdv_http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "mmdv_http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(started.elapsed().as_secs_f64());

    response
}
