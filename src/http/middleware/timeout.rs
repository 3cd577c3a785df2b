//! Per-request deadline.

use std::time::Duration;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::error::AppError;

/// Fail with 408 when the inner service runs past the deadline.
pub async fn request_timeout(
    State(limit): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            let ms = limit.as_millis() as u64;
            tracing::warn!(path = %path, timeout_ms = ms, "Request timed out");
            AppError::Timeout(ms).into_response()
        }
    }
}
