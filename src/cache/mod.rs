//! Response cache storage.
//!
//! # Responsibilities
//! - Hold buffered GET responses until their TTL runs out
//! - Drop entries by key substring when the underlying data changes
//!
//! # Design Decisions
//! - Storage sits behind [`ResponseCacheStore`] so a shared cache can replace
//!   the per-process map
//! - Expired entries are removed lazily: on lookup and on each insert

use std::time::{Duration, Instant};
use axum::body::Bytes;
use dashmap::DashMap;

/// A buffered response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub expires_at: Instant,
}

impl CachedResponse {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Whole seconds left before expiry, rounded up.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        let remaining = self.expires_at.saturating_duration_since(now);
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }
}

pub trait ResponseCacheStore: Send + Sync {
    /// Live entry for `key`; expired entries are removed and not returned.
    fn get(&self, key: &str, now: Instant) -> Option<CachedResponse>;

    fn insert(&self, key: String, response: CachedResponse);

    /// Remove every entry whose key contains `pattern`. Returns how many were removed.
    fn invalidate_matching(&self, pattern: &str) -> usize;

    fn purge_expired(&self, now: Instant) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct InMemoryResponseCache {
    entries: DashMap<String, CachedResponse>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseCacheStore for InMemoryResponseCache {
    fn get(&self, key: &str, now: Instant) -> Option<CachedResponse> {
        let entry = self.entries.get(key).map(|entry| entry.value().clone())?;
        if entry.is_expired(now) {
            self.entries.remove(key);
            return None;
        }
        Some(entry)
    }

    fn insert(&self, key: String, response: CachedResponse) {
        self.entries.insert(key, response);
    }

    fn invalidate_matching(&self, pattern: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.contains(pattern));
        before.saturating_sub(self.entries.len())
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Build an entry expiring `ttl` after `now`.
pub fn entry(
    status: u16,
    content_type: Option<String>,
    body: Bytes,
    now: Instant,
    ttl: Duration,
) -> CachedResponse {
    CachedResponse {
        status,
        content_type,
        body,
        expires_at: now + ttl,
    }
}
