//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, status
//! - `http_request_duration_seconds` (histogram): latency by method
//! - `security_violations_total` (counter): rejections by security code
//! - `response_cache_total` (counter): cache lookups by result
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter listens on its own address

use std::net::SocketAddr;
use std::time::Instant;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(elapsed);
}

pub fn record_security_violation(code: &'static str) {
    metrics::counter!("security_violations_total", "code" => code).increment(1);
}

pub fn record_cache(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("response_cache_total", "result" => result).increment(1);
}
