// ============================================================================
// Prometheus Metrics Middleware
// ============================================================================
//
// ## Metrics Collected:
//
// 1. **HTTP Request Duration**
//    - Histogram: pharmacy_locator_http_request_duration_seconds
//    - Labels: method, path, status
//
// 2. **HTTP Request Total**
//    - Counter: pharmacy_locator_http_requests_total
//    - Labels: method, path, status
//
// 3. **Search Result Size**
//    - Histogram: pharmacy_locator_search_results
//    - Labels: kind (availability, catalog)
//
// 4. **Store Failures**
//    - Counter: pharmacy_locator_store_failures_total
//    - Labels: reason
//
// ## Endpoints:
//
// - GET /metrics - Prometheus scrape endpoint
//
// ============================================================================

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{
    Encoder, TextEncoder, HistogramVec, CounterVec,
    register_histogram_vec, register_counter_vec,
};
use std::time::Instant;

lazy_static! {
    /// HTTP request duration histogram
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "pharmacy_locator_http_request_duration_seconds",
        "HTTP request latency in seconds",
        &["method", "path", "status"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]
    ).unwrap();

    /// HTTP request counter
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "pharmacy_locator_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    ).unwrap();

    /// Number of results returned per search
    pub static ref SEARCH_RESULTS: HistogramVec = register_histogram_vec!(
        "pharmacy_locator_search_results",
        "Number of results returned by a search",
        &["kind"],
        vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0]
    ).unwrap();

    /// Store failures by reason
    pub static ref STORE_FAILURES_TOTAL: CounterVec = register_counter_vec!(
        "pharmacy_locator_store_failures_total",
        "Total number of inventory/pharmacy store failures",
        &["reason"]
    ).unwrap();
}

/// Collapse UUID and numeric path segments so label cardinality stays bounded.
///
/// Example: /api/pharmacies/550e8400-.../medicines -> /api/pharmacies/:id/medicines
fn normalize_path(path: &str) -> String {
    let normalized: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if uuid::Uuid::parse_str(segment).is_ok() || segment.parse::<i64>().is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", normalized.join("/"))
}

pub async fn metrics_middleware(
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();
    let status_str = status.as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), &path, &status_str])
        .observe(duration.as_secs_f64());

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), &path, &status_str])
        .inc();

    tracing::debug!(
        target: "metrics",
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "HTTP request completed"
    );

    response
}

/// Returns Prometheus-formatted metrics for scraping
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            buffer
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                format!("Failed to encode metrics: {}", e).into_bytes()
            )
        }
    }
}

pub fn record_search_results(kind: &str, count: usize) {
    SEARCH_RESULTS.with_label_values(&[kind]).observe(count as f64);
}

pub fn record_store_failure(reason: &str) {
    STORE_FAILURES_TOTAL.with_label_values(&[reason]).inc();
}
