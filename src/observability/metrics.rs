//! Metrics collection.
//!
//! # Metrics
//! - `http_client_requests_total` (counter): completed requests by method, status
//! - `http_client_request_duration_seconds` (histogram): whole-operation latency
//! - `http_client_redirects_total` (counter): redirects followed
//! - `http_client_errors_total` (counter): failed requests by error kind
//!
//! Without an installed recorder these calls are no-ops.

use std::time::Instant;

/// Record a completed request.
pub fn record_request(method: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "http_client_requests_total",
        "method" => method,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("http_client_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

/// Record one followed redirect.
pub fn record_redirect() {
    ::metrics::counter!("http_client_redirects_total").increment(1);
}

/// Record a failed request.
pub fn record_error(method: &'static str, kind: &'static str, start: Instant) {
    ::metrics::counter!(
        "http_client_errors_total",
        "method" => method,
        "kind" => kind
    )
    .increment(1);
    ::metrics::histogram!("http_client_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}
