//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Runtime environment and bind address.
    pub app: AppSection,

    /// Example store location.
    pub database: DatabaseConfig,

    /// Request security filter settings.
    pub security: SecurityConfig,

    /// Bearer token guard.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// GET response cache.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// True when running with `env = "development"`.
    pub fn is_development(&self) -> bool {
        self.app.env == "development"
    }

    /// True when running with `env = "production"`.
    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }

    /// Whether the request security filter is enforced.
    ///
    /// An explicit `security.enabled` wins; otherwise security is on
    /// everywhere except development.
    pub fn security_enabled(&self) -> bool {
        self.security.enabled.unwrap_or(!self.is_development())
    }

    /// Development with security switched off skips every request check.
    pub fn security_bypassed(&self) -> bool {
        self.is_development() && !self.security_enabled()
    }

    /// Socket address string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

/// Environment and listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSection {
    /// Runtime environment: "production", "staging", "development", "test".
    pub env: String,

    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            env: "production".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Example store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// JSON file the store is loaded from and flushed to.
    pub path: String,

    /// Persist writes to `path`. When false the store is memory only.
    pub persist: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "database.json".to_string(),
            persist: false,
        }
    }
}

/// Security filter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Explicit on/off switch. `None` means "on unless development".
    pub enabled: Option<bool>,

    /// Accepted `Host` header values.
    pub allowed_hosts: Vec<String>,

    /// Accepted `Origin` header values ("*" accepts any).
    pub allowed_origins: Vec<String>,

    /// Client IPs rejected outright.
    pub blacklisted_ips: Vec<String>,

    /// Client IP prefixes or `a.b.c.d/n` ranges rejected outright.
    pub blacklisted_ranges: Vec<String>,

    /// User-Agent substrings of known scanners.
    pub suspicious_user_agents: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Maximum length of any string in body or query.
    pub max_string_length: usize,

    /// Maximum URL length (path + query).
    pub max_url_length: usize,

    /// Per-IP request counting.
    pub rate_limit: RateLimitConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            allowed_hosts: vec![
                "localhost:3000".to_string(),
                "localhost".to_string(),
                "127.0.0.1:3000".to_string(),
                "127.0.0.1".to_string(),
            ],
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://localhost:3000".to_string(),
            ],
            blacklisted_ips: Vec::new(),
            blacklisted_ranges: Vec::new(),
            suspicious_user_agents: DEFAULT_SUSPICIOUS_AGENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_body_size: 1024 * 1024, // 1MB
            max_string_length: 10_000,
            max_url_length: 2048,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

const DEFAULT_SUSPICIOUS_AGENTS: &[&str] = &[
    "sqlmap",
    "nikto",
    "burp",
    "w3af",
    "acunetix",
    "netsparker",
    "havij",
    "pangolin",
    "nmap",
    "hydra",
    "medusa",
    "brutus",
    "gobuster",
    "dirb",
    "dirbuster",
    "wfuzz",
    "ffuf",
];

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    pub window_secs: u64,

    /// Requests allowed per client inside one window.
    pub max_requests: u32,

    /// How often expired counters are swept from the store.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
            sweep_interval_secs: 300,
        }
    }
}

/// Bearer token (JWT) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require a valid token on `/examples` routes.
    pub enabled: bool,

    /// HS256 signing secret.
    pub secret: String,

    /// Expected `iss` claim.
    pub issuer: String,

    /// Expected `aud` claim.
    pub audience: String,

    /// Lifetime of issued tokens in seconds.
    pub expires_in_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            secret: "your-super-secret-jwt-key-change-in-production".to_string(),
            issuer: "api-base-project".to_string(),
            audience: "api-base-project-users".to_string(),
            expires_in_secs: 15 * 60,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Handler deadline in milliseconds.
    pub request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 30_000 }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache successful GET responses on `/examples` routes.
    pub enabled: bool,

    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_defaults_follow_environment() {
        let mut config = AppConfig::default();
        assert!(config.is_production());
        assert!(config.security_enabled());
        assert!(!config.security_bypassed());

        config.app.env = "development".into();
        assert!(!config.security_enabled());
        assert!(config.security_bypassed());

        config.security.enabled = Some(true);
        assert!(!config.security_bypassed());

        // Outside development an explicit "off" does not bypass the filter
        config.app.env = "staging".into();
        config.security.enabled = Some(false);
        assert!(!config.security_bypassed());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [app]
            port = 8080

            [security.rate_limit]
            max_requests = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.app.env, "production");
        assert_eq!(config.security.rate_limit.max_requests, 5);
        assert_eq!(config.security.rate_limit.window_secs, 900);
        assert_eq!(config.security.max_body_size, 1024 * 1024);
        assert_eq!(config.security.suspicious_user_agents.len(), 17);
    }
}
