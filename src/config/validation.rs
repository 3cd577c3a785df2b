//! Configuration validation.
//!
//! Semantic checks that serde cannot express: value ranges, parseable
//! addresses, known enum-like strings. All problems are collected so a bad
//! config file is reported in one go.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

const KNOWN_ENVS: &[&str] = &["production", "staging", "development", "test"];

/// Validate a loaded configuration, returning every error found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !KNOWN_ENVS.contains(&config.app.env.as_str()) {
        errors.push(ValidationError::new(
            "app.env",
            format!("unknown environment '{}'", config.app.env),
        ));
    }

    if config.bind_address().parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "app.host",
            format!("'{}' is not a valid bind address", config.bind_address()),
        ));
    }

    if config.database.persist && config.database.path.trim().is_empty() {
        errors.push(ValidationError::new(
            "database.path",
            "must be set when persistence is enabled",
        ));
    }

    let security = &config.security;
    if security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }
    if security.max_string_length == 0 {
        errors.push(ValidationError::new("security.max_string_length", "must be > 0"));
    }
    if security.max_url_length == 0 {
        errors.push(ValidationError::new("security.max_url_length", "must be > 0"));
    }
    if security.rate_limit.window_secs == 0 {
        errors.push(ValidationError::new("security.rate_limit.window_secs", "must be > 0"));
    }
    if security.rate_limit.max_requests == 0 {
        errors.push(ValidationError::new("security.rate_limit.max_requests", "must be > 0"));
    }
    if security.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::new(
            "security.rate_limit.sweep_interval_secs",
            "must be > 0",
        ));
    }
    if security.allowed_hosts.is_empty() && config.security_enabled() {
        errors.push(ValidationError::new(
            "security.allowed_hosts",
            "at least one host is required while the filter is enabled",
        ));
    }

    if config.auth.enabled && config.auth.secret.len() < 16 {
        errors.push(ValidationError::new(
            "auth.secret",
            "must be at least 16 characters when auth is enabled",
        ));
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::new("timeouts.request_ms", "must be > 0"));
    }

    if config.cache.enabled && config.cache.ttl_secs == 0 {
        errors.push(ValidationError::new("cache.ttl_secs", "must be > 0 when caching is enabled"));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected 'pretty' or 'json', got '{}'", config.observability.log_format),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "is not a valid socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
