//! Hot-swappable security policy.
//!
//! The policy is the part of the configuration the request filter consults
//! on every request. It is rebuilt from [`AppConfig`] on reload and swapped
//! in atomically by the server.

use std::time::Duration;
use axum::http::HeaderMap;

use crate::config::AppConfig;
use crate::security::violation::SecurityViolation;

/// Request filter settings derived from configuration.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    /// Skip all request checks (development with security switched off).
    pub bypass: bool,
    /// Strict CSP without `'unsafe-inline'`.
    pub production: bool,
    pub allowed_hosts: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub blacklisted_ips: Vec<String>,
    pub blacklisted_ranges: Vec<String>,
    /// Lower-cased User-Agent substrings.
    pub suspicious_user_agents: Vec<String>,
    pub max_body_size: usize,
    pub max_string_length: usize,
    pub max_url_length: usize,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
}

impl SecurityPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        let security = &config.security;
        Self {
            bypass: config.security_bypassed(),
            production: config.is_production(),
            allowed_hosts: security.allowed_hosts.clone(),
            allowed_origins: security.allowed_origins.clone(),
            blacklisted_ips: security.blacklisted_ips.clone(),
            blacklisted_ranges: security.blacklisted_ranges.clone(),
            suspicious_user_agents: security
                .suspicious_user_agents
                .iter()
                .map(|agent| agent.to_lowercase())
                .collect(),
            max_body_size: security.max_body_size,
            max_string_length: security.max_string_length,
            max_url_length: security.max_url_length,
            rate_limit_window: Duration::from_secs(security.rate_limit.window_secs),
            rate_limit_max: security.rate_limit.max_requests,
        }
    }

    /// Accept `host` when it equals an allowed entry, or carries the allowed
    /// hostname followed by any port.
    pub fn is_valid_host(&self, host: &str) -> bool {
        if host.is_empty() {
            return false;
        }
        self.allowed_hosts.iter().any(|allowed| {
            let hostname = allowed.split(':').next().unwrap_or_default();
            host == allowed || host.starts_with(&format!("{hostname}:"))
        })
    }

    pub fn is_valid_origin(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }

    pub fn is_suspicious_user_agent(&self, user_agent: &str) -> bool {
        let lower = user_agent.to_lowercase();
        self.suspicious_user_agents
            .iter()
            .any(|agent| lower.contains(agent.as_str()))
    }

    /// Exact IP match, or prefix match against the configured ranges.
    ///
    /// A range of the form `network/mask` keeps the first `mask / 8` octets
    /// of the network and matches by string prefix; a range without a mask
    /// is used as the prefix directly.
    pub fn is_blacklisted_ip(&self, ip: &str) -> bool {
        if self.blacklisted_ips.iter().any(|blocked| blocked == ip) {
            return true;
        }

        self.blacklisted_ranges.iter().any(|range| {
            if let Some((network, mask)) = range.split_once('/') {
                if network.is_empty() || mask.is_empty() {
                    return false;
                }
                let Ok(mask) = mask.parse::<usize>() else {
                    return false;
                };
                let prefix = network
                    .split('.')
                    .take(mask / 8)
                    .collect::<Vec<_>>()
                    .join(".");
                ip.starts_with(&prefix)
            } else {
                ip.starts_with(range.as_str())
            }
        })
    }

    /// Validate `Origin` and reject header values carrying line breaks.
    pub fn check_headers(&self, headers: &HeaderMap) -> Result<(), SecurityViolation> {
        if let Some(origin) = headers.get("origin") {
            let origin = origin.to_str().unwrap_or_default();
            if !self.is_valid_origin(origin) {
                return Err(SecurityViolation::invalid_origin());
            }
        }

        if headers.values().any(|value| has_line_break(value.as_bytes())) {
            return Err(SecurityViolation::header_injection());
        }

        Ok(())
    }
}

/// True when raw header bytes contain CR or LF.
pub fn has_line_break(bytes: &[u8]) -> bool {
    bytes.iter().any(|b| *b == b'\n' || *b == b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn policy() -> SecurityPolicy {
        SecurityPolicy::from_config(&AppConfig::default())
    }

    #[test]
    fn test_host_allow_list() {
        let policy = policy();
        assert!(policy.is_valid_host("localhost"));
        assert!(policy.is_valid_host("localhost:3000"));
        assert!(policy.is_valid_host("127.0.0.1:54321"));
        assert!(!policy.is_valid_host(""));
        assert!(!policy.is_valid_host("evil.com"));
        assert!(!policy.is_valid_host("localhost.evil.com"));
    }

    #[test]
    fn test_origin_allow_list() {
        let mut policy = policy();
        assert!(policy.is_valid_origin("http://localhost:3000"));
        assert!(!policy.is_valid_origin("http://evil.com"));

        policy.allowed_origins = vec!["*".into()];
        assert!(policy.is_valid_origin("http://evil.com"));
    }

    #[test]
    fn test_user_agent_blacklist_is_case_insensitive() {
        let policy = policy();
        assert!(policy.is_suspicious_user_agent("sqlmap/1.7"));
        assert!(policy.is_suspicious_user_agent("Mozilla/5.0 (Nikto)"));
        assert!(!policy.is_suspicious_user_agent("Mozilla/5.0"));
    }

    #[test]
    fn test_ip_blacklist() {
        let mut policy = policy();
        policy.blacklisted_ips = vec!["203.0.113.9".into()];
        policy.blacklisted_ranges = vec![
            "10.1.0.0/16".into(),
            "192.168.".into(),
            "172.16.0.0/abc".into(),
        ];

        assert!(policy.is_blacklisted_ip("203.0.113.9"));
        assert!(policy.is_blacklisted_ip("10.1.200.3"));
        assert!(!policy.is_blacklisted_ip("10.2.0.1"));
        assert!(policy.is_blacklisted_ip("192.168.1.1"));
        assert!(!policy.is_blacklisted_ip("172.16.0.1"));
        assert!(!policy.is_blacklisted_ip("127.0.0.1"));
    }

    #[test]
    fn test_origin_header_checked() {
        let policy = policy();
        let mut headers = HeaderMap::new();
        headers.insert("origin", HeaderValue::from_static("http://evil.com"));

        let err = policy.check_headers(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.message, "Invalid origin header");
    }

    #[test]
    fn test_line_break_detection() {
        assert!(has_line_break(b"value\r\nSet-Cookie: x"));
        assert!(has_line_break(b"value\n"));
        assert!(!has_line_break(b"plain value"));
    }
}
