//! Fixed-window rate limiting keyed by client IP.
//!
//! # Responsibilities
//! - Count requests per client within a fixed window
//! - Reject once the window budget is spent, reporting seconds until reset
//! - Periodically drop expired windows
//!
//! # Design Decisions
//! - Counters live behind the [`RateLimitStore`] trait so a shared store can
//!   replace the in-process map for multi-instance deployments
//! - A denied request does not increment the counter

use std::sync::Arc;
use std::time::{Duration, Instant};
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::security::violation::SecurityViolation;

/// Counter state for one client.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

/// Result of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub allowed: bool,
    pub count: u32,
    pub reset_at: Instant,
}

/// Storage for rate-limit counters.
pub trait RateLimitStore: Send + Sync {
    fn get(&self, key: &str) -> Option<RateLimitEntry>;

    /// Count one request for `key` and decide whether it is allowed.
    fn increment(&self, key: &str, now: Instant, window: Duration, max: u32) -> RateLimitOutcome;

    fn expire(&self, key: &str);

    /// Remove every window that ended before `now`. Returns how many were removed.
    fn purge_expired(&self, now: Instant) -> usize;
}

/// Process-local counter store.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|entry| *entry.value())
    }

    fn increment(&self, key: &str, now: Instant, window: Duration, max: u32) -> RateLimitOutcome {
        // The entry guard holds the shard lock, so check-and-increment is atomic per key.
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry {
                count: 0,
                reset_at: now + window,
            });

        if entry.count == 0 || now > entry.reset_at {
            entry.count = 1;
            entry.reset_at = now + window;
            return RateLimitOutcome {
                allowed: true,
                count: 1,
                reset_at: entry.reset_at,
            };
        }

        if entry.count >= max {
            return RateLimitOutcome {
                allowed: false,
                count: entry.count,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        RateLimitOutcome {
            allowed: true,
            count: entry.count,
            reset_at: entry.reset_at,
        }
    }

    fn expire(&self, key: &str) {
        self.entries.remove(key);
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_at >= now);
        before.saturating_sub(self.entries.len())
    }
}

/// Rate limiter applied by the security filter.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRateLimitStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }

    pub fn check(&self, key: &str, window: Duration, max: u32) -> Result<(), SecurityViolation> {
        self.check_at(key, Instant::now(), window, max)
    }

    pub fn check_at(
        &self,
        key: &str,
        now: Instant,
        window: Duration,
        max: u32,
    ) -> Result<(), SecurityViolation> {
        let outcome = self.store.increment(key, now, window, max);
        if outcome.allowed {
            return Ok(());
        }

        let remaining = outcome.reset_at.saturating_duration_since(now);
        let retry_after = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        tracing::warn!(client = %key, count = outcome.count, retry_after, "Rate limit exceeded");
        Err(SecurityViolation::rate_limited(retry_after))
    }

    /// Purge expired windows every `interval` until shutdown.
    pub async fn run_sweeper(self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.store.purge_expired(Instant::now());
                    if removed > 0 {
                        tracing::debug!(removed, "Purged expired rate limit windows");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate limit sweeper stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const WINDOW: Duration = Duration::from_secs(900);

    #[test]
    fn test_limit_reached_after_max_requests() {
        let limiter = RateLimiter::in_memory();
        let now = Instant::now();

        for _ in 0..100 {
            assert!(limiter.check_at("10.0.0.1", now, WINDOW, 100).is_ok());
        }

        let err = limiter.check_at("10.0.0.1", now, WINDOW, 100).unwrap_err();
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.retry_after, Some(900));

        // Other clients have their own window.
        assert!(limiter.check_at("10.0.0.2", now, WINDOW, 100).is_ok());
    }

    #[test]
    fn test_denied_requests_do_not_count() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let limiter = RateLimiter::new(store.clone());
        let now = Instant::now();

        for _ in 0..5 {
            let _ = limiter.check_at("client", now, WINDOW, 2);
        }
        assert_eq!(store.get("client").map(|e| e.count), Some(2));
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::in_memory();
        let start = Instant::now();
        let window = Duration::from_secs(10);

        assert!(limiter.check_at("client", start, window, 1).is_ok());
        assert!(limiter.check_at("client", start + Duration::from_secs(5), window, 1).is_err());

        let later = start + Duration::from_secs(11);
        assert!(limiter.check_at("client", later, window, 1).is_ok());
    }

    #[test]
    fn test_purge_expired() {
        let store = InMemoryRateLimitStore::new();
        let now = Instant::now();
        store.increment("old", now, Duration::from_secs(1), 10);
        store.increment("fresh", now, Duration::from_secs(60), 10);

        let removed = store.purge_expired(now + Duration::from_secs(2));
        assert_eq!(removed, 1);
        assert!(store.get("old").is_none());
        assert!(store.get("fresh").is_some());

        store.expire("fresh");
        assert!(store.is_empty());
    }
}
