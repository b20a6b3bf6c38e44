//! Metrics collection and exposition.
//!
//! # Metrics
//! - `portfolio_requests_total` (counter): requests by method, route, status
//! - `portfolio_request_duration_seconds` (histogram): latency distribution
//! - `portfolio_rate_limited_total` (counter): rejections by policy
//! - `portfolio_content_operations_total` (counter): store calls by operation, outcome
//! - `portfolio_sign_in_total` (counter): sign-in attempts by outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, address = %addr, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "portfolio_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "portfolio_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(policy: &'static str) {
    ::metrics::counter!("portfolio_rate_limited_total", "policy" => policy).increment(1);
}

pub fn record_content_operation(operation: &'static str, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    ::metrics::counter!(
        "portfolio_content_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_sign_in(outcome: &'static str) {
    ::metrics::counter!("portfolio_sign_in_total", "outcome" => outcome).increment(1);
}
