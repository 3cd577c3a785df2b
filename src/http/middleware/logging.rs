//! Request/response logging.

use std::time::{Duration, Instant};
use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::observability::metrics;
use crate::security::filter::client_ip;
use crate::security::patterns::sanitize_input;

/// Requests slower than this are logged at warn level.
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(1000);

pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let ip = client_ip(&request);
    let user_agent = request
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(sanitize_input)
        .unwrap_or_default();

    tracing::info!(
        method = %method,
        uri = %uri,
        client_ip = %ip,
        user_agent = %user_agent,
        "Incoming request"
    );

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let latency = start.elapsed();
    let latency_ms = latency.as_millis() as u64;

    if response.status().is_client_error() || response.status().is_server_error() {
        tracing::error!(method = %method, uri = %uri, status, latency_ms, "Request failed");
    } else {
        tracing::info!(method = %method, uri = %uri, status, latency_ms, "Request completed");
    }

    if latency > SLOW_REQUEST_THRESHOLD {
        tracing::warn!(method = %method, uri = %uri, latency_ms, "Slow request");
    }

    metrics::record_request(&method, status, start);
    response
}
