//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, with environment
/// overrides applied on top.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    finish(config)
}

/// Build configuration without a file: defaults plus environment.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    finish(AppConfig::default())
}

fn finish(mut config: AppConfig) -> Result<AppConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts `std::env::var` so overrides can be tested without
/// touching the process environment.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(env) = lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
        config.app.env = env;
    }
    if let Some(host) = lookup("HOST") {
        config.app.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.app.port = parse_env("PORT", &port)?;
    }
    if let Some(path) = lookup("DATABASE_PATH") {
        config.database.path = path;
        config.database.persist = true;
    }
    if let Some(enabled) = lookup("SECURITY_ENABLED") {
        // Anything other than "true" switches the filter off.
        config.security.enabled = Some(enabled == "true");
    }
    if let Some(hosts) = lookup("ALLOWED_HOSTS") {
        config.security.allowed_hosts = split_list(&hosts);
    }
    if let Some(origins) = lookup("ALLOWED_ORIGINS") {
        config.security.allowed_origins = split_list(&origins);
    }
    if let Some(window) = lookup("RATE_LIMIT_WINDOW_SECS") {
        config.security.rate_limit.window_secs = parse_env("RATE_LIMIT_WINDOW_SECS", &window)?;
    }
    if let Some(max) = lookup("RATE_LIMIT_MAX") {
        config.security.rate_limit.max_requests = parse_env("RATE_LIMIT_MAX", &max)?;
    }
    if let Some(secret) = lookup("JWT_SECRET") {
        config.auth.secret = secret;
    }
    if let Some(issuer) = lookup("JWT_ISSUER") {
        config.auth.issuer = issuer;
    }
    if let Some(audience) = lookup("JWT_AUDIENCE") {
        config.auth.audience = audience;
    }
    if let Some(timeout) = lookup("REQUEST_TIMEOUT_MS") {
        config.timeouts.request_ms = parse_env("REQUEST_TIMEOUT_MS", &timeout)?;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("NODE_ENV", "development"),
                ("PORT", "8088"),
                ("SECURITY_ENABLED", "yes"),
                ("ALLOWED_HOSTS", "api.local, 10.0.0.1 ,"),
                ("RATE_LIMIT_MAX", "7"),
                ("DATABASE_PATH", "/tmp/examples.json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 8088);
        assert_eq!(config.security.enabled, Some(false));
        assert_eq!(config.security.allowed_hosts, vec!["api.local", "10.0.0.1"]);
        assert_eq!(config.security.rate_limit.max_requests, 7);
        assert!(config.database.persist);
    }

    #[test]
    fn test_app_env_wins_over_node_env() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("APP_ENV", "staging"), ("NODE_ENV", "development")]),
        )
        .unwrap();
        assert_eq!(config.app.env, "staging");
    }

    #[test]
    fn test_invalid_numeric_env() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "PORT", .. }));
    }

    #[test]
    fn test_load_config_reports_validation_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nrequest_ms = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.field == "timeouts.request_ms"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
