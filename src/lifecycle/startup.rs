//! Startup reporting.

use crate::config::AppConfig;

/// Log the effective configuration, warning loudly when request checks are off.
pub fn log_startup_banner(config: &AppConfig) {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %config.app.env,
        bind_address = %config.bind_address(),
        "api-base starting"
    );

    tracing::info!(
        security_enabled = config.security_enabled(),
        allowed_hosts = ?config.security.allowed_hosts,
        allowed_origins = ?config.security.allowed_origins,
        rate_limit_window_secs = config.security.rate_limit.window_secs,
        rate_limit_max = config.security.rate_limit.max_requests,
        max_body_size = config.security.max_body_size,
        "Security configuration"
    );

    tracing::info!(
        auth_enabled = config.auth.enabled,
        cache_enabled = config.cache.enabled,
        cache_ttl_secs = config.cache.ttl_secs,
        request_timeout_ms = config.timeouts.request_ms,
        persist = config.database.persist,
        "Service configuration"
    );

    if config.security_bypassed() {
        tracing::warn!(
            "SECURITY CHECKS DISABLED: development mode without security.enabled; \
             every request skips host, rate limit, blacklist and content checks"
        );
    }
}
