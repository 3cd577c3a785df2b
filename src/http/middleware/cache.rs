//! GET response caching middleware.
//!
//! Successful GET responses are buffered and replayed until their TTL runs
//! out. A successful write through the same router clears every entry whose
//! key contains the invalidation pattern.

use std::sync::Arc;
use std::time::{Duration, Instant};
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::cache::{self, CachedResponse, ResponseCacheStore};
use crate::http::error::AppError;
use crate::observability::metrics;

pub const X_CACHE: &str = "x-cache";
pub const X_CACHE_TTL: &str = "x-cache-ttl";

#[derive(Clone)]
pub struct CacheState {
    pub store: Arc<dyn ResponseCacheStore>,
    pub ttl: Duration,
    /// Writes clear entries whose key contains this.
    pub invalidate_pattern: String,
}

/// `METHOD path?query`
pub fn cache_key(method: &Method, uri: &Uri) -> String {
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_else(|| uri.path());
    format!("{method} {target}")
}

fn replay(entry: &CachedResponse, now: Instant) -> Response {
    let status = StatusCode::from_u16(entry.status).unwrap_or(StatusCode::OK);
    let mut response = (status, entry.body.clone()).into_response();
    let headers = response.headers_mut();

    if let Some(content_type) = entry.content_type.as_deref().and_then(|ct| HeaderValue::from_str(ct).ok()) {
        headers.insert(header::CONTENT_TYPE, content_type);
    }
    headers.insert(X_CACHE, HeaderValue::from_static("HIT"));
    headers.insert(X_CACHE_TTL, HeaderValue::from(entry.remaining_secs(now)));
    response
}

pub async fn response_cache(
    State(state): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        let response = next.run(request).await;
        if response.status().is_success() {
            let cleared = state.store.invalidate_matching(&state.invalidate_pattern);
            if cleared > 0 {
                tracing::debug!(cleared, pattern = %state.invalidate_pattern, "Cache invalidated");
            }
        }
        return response;
    }

    let key = cache_key(request.method(), request.uri());
    let now = Instant::now();

    if let Some(entry) = state.store.get(&key, now) {
        tracing::debug!(key = %key, "Cache hit");
        metrics::record_cache(true);
        return replay(&entry, now);
    }

    metrics::record_cache(false);
    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => return AppError::internal(e).into_response(),
    };

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let purged = state.store.purge_expired(now);
    if purged > 0 {
        tracing::debug!(purged, "Purged expired cache entries");
    }
    state.store.insert(
        key,
        cache::entry(parts.status.as_u16(), content_type, bytes.clone(), now, state.ttl),
    );

    parts.headers.insert(X_CACHE, HeaderValue::from_static("MISS"));
    parts.headers.insert(X_CACHE_TTL, HeaderValue::from(state.ttl.as_secs()));
    Response::from_parts(parts, Body::from(bytes))
}
