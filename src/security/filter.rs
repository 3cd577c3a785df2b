//! Request security filter middleware.
//!
//! # Data Flow
//! ```text
//! request
//!     → bypass? (development with security off) → handler
//!     → host allow-list
//!     → rate limit (per client IP)
//!     → User-Agent blacklist
//!     → IP blacklist
//!     → Origin / header injection
//!     → Content-Length, then buffered body scan
//!     → query scan
//!     → URL scan
//!     → handler (body re-attached)
//! response
//!     → security headers, server headers stripped
//! ```
//!
//! The first failing check short-circuits with its violation.

use std::net::SocketAddr;
use std::sync::Arc;
use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::error::AppError;
use crate::observability::metrics;
use crate::security::headers::apply_security_headers;
use crate::security::limits::check_content_length;
use crate::security::patterns::sanitize_input;
use crate::security::policy::SecurityPolicy;
use crate::security::rate_limit::RateLimiter;
use crate::security::scanner::{check_url, scan_body, scan_query};
use crate::security::violation::SecurityViolation;

/// State shared by the filter.
#[derive(Clone)]
pub struct SecurityState {
    pub policy: Arc<ArcSwap<SecurityPolicy>>,
    pub limiter: RateLimiter,
}

impl SecurityState {
    pub fn new(policy: SecurityPolicy, limiter: RateLimiter) -> Self {
        Self {
            policy: Arc::new(ArcSwap::from_pointee(policy)),
            limiter,
        }
    }
}

/// Client IP from the socket, falling back to `X-Forwarded-For`.
pub fn client_ip(request: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

pub async fn security_filter(
    State(state): State<SecurityState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let policy = state.policy.load_full();
    let ip = client_ip(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user_agent = sanitize_input(header_str(request.headers(), header::USER_AGENT));

    let mut response = if policy.bypass {
        tracing::debug!(method = %method, path = %path, "Security checks bypassed in development");
        next.run(request).await
    } else {
        match screen(&state, &policy, &ip, request).await {
            Ok(request) => next.run(request).await,
            Err(violation) => {
                tracing::warn!(
                    code = violation.code(),
                    severity = ?violation.severity(),
                    client_ip = %ip,
                    method = %method,
                    path = %path,
                    user_agent = %user_agent,
                    reason = %violation.message,
                    "Security violation"
                );
                metrics::record_security_violation(violation.code());
                AppError::Security(violation).into_response()
            }
        }
    };

    apply_security_headers(response.headers_mut(), policy.production);
    response
}

/// Run every check and hand back the request with its body re-attached.
async fn screen(
    state: &SecurityState,
    policy: &SecurityPolicy,
    ip: &str,
    request: Request<Body>,
) -> Result<Request<Body>, SecurityViolation> {
    let headers = request.headers();

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default();
    if !policy.is_valid_host(&host) {
        return Err(SecurityViolation::invalid_host());
    }

    state
        .limiter
        .check(ip, policy.rate_limit_window, policy.rate_limit_max)?;

    if policy.is_suspicious_user_agent(header_str(headers, header::USER_AGENT)) {
        return Err(SecurityViolation::suspicious_user_agent());
    }

    if policy.is_blacklisted_ip(ip) {
        return Err(SecurityViolation::blacklisted_ip());
    }

    policy.check_headers(headers)?;
    check_content_length(headers, policy.max_body_size)?;

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, policy.max_body_size)
        .await
        .map_err(|_| SecurityViolation::payload_too_large())?;

    if !bytes.is_empty() {
        // Non-JSON bodies are left for the handler's extractor to reject.
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            scan_body(&value, policy.max_string_length)?;
        }
    }

    if let Ok(Query(params)) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
        scan_query(&params, policy.max_string_length)?;
    }

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());
    check_url(target, policy.max_url_length)?;

    Ok(Request::from_parts(parts, Body::from(bytes)))
}
