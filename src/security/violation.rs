//! Security violation taxonomy.
//!
//! Every rejection produced by the request filter is a [`SecurityViolation`]:
//! a category (which fixes the security code and severity), an HTTP status
//! and a human-readable message.

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Severity attached to a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Category of a detected violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    SqlInjection,
    Xss,
    CommandInjection,
    PathTraversal,
    RateLimit,
    SuspiciousActivity,
    PayloadTooLarge,
}

impl ViolationKind {
    /// Stable identifier reported to clients and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::SqlInjection => "SEC_001_SQL_INJECTION",
            ViolationKind::Xss => "SEC_002_XSS_ATTEMPT",
            ViolationKind::CommandInjection => "SEC_003_COMMAND_INJECTION",
            ViolationKind::PathTraversal => "SEC_004_PATH_TRAVERSAL",
            ViolationKind::RateLimit => "SEC_005_RATE_LIMIT",
            ViolationKind::SuspiciousActivity => "SEC_006_SUSPICIOUS_ACTIVITY",
            ViolationKind::PayloadTooLarge => "SEC_007_PAYLOAD_TOO_LARGE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ViolationKind::CommandInjection => Severity::Critical,
            ViolationKind::RateLimit | ViolationKind::PayloadTooLarge => Severity::Medium,
            _ => Severity::High,
        }
    }
}

/// A rejected request.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SecurityViolation {
    pub kind: ViolationKind,
    pub status: StatusCode,
    pub message: String,
    /// Seconds until the client may retry (rate limiting only).
    pub retry_after: Option<u64>,
}

impl SecurityViolation {
    pub fn new(kind: ViolationKind, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Content rejected while scanning body, query or URL (400).
    pub fn content(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self::new(kind, StatusCode::BAD_REQUEST, message)
    }

    pub fn invalid_host() -> Self {
        Self::new(
            ViolationKind::SuspiciousActivity,
            StatusCode::BAD_REQUEST,
            "Invalid host header",
        )
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::new(
                ViolationKind::RateLimit,
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests",
            )
        }
    }

    pub fn suspicious_user_agent() -> Self {
        Self::new(
            ViolationKind::SuspiciousActivity,
            StatusCode::FORBIDDEN,
            "Suspicious user agent detected",
        )
    }

    pub fn blacklisted_ip() -> Self {
        Self::new(ViolationKind::SuspiciousActivity, StatusCode::FORBIDDEN, "Access denied")
    }

    pub fn invalid_origin() -> Self {
        Self::new(
            ViolationKind::SuspiciousActivity,
            StatusCode::FORBIDDEN,
            "Invalid origin header",
        )
    }

    pub fn header_injection() -> Self {
        Self::new(
            ViolationKind::SuspiciousActivity,
            StatusCode::BAD_REQUEST,
            "Header injection detected",
        )
    }

    pub fn payload_too_large() -> Self {
        Self::new(
            ViolationKind::PayloadTooLarge,
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request entity too large",
        )
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Details object attached to the error envelope.
    pub fn details(&self) -> serde_json::Value {
        let mut details = serde_json::json!({
            "securityCode": self.code(),
            "severity": self.severity(),
            "type": "SECURITY_VIOLATION",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(retry_after) = self.retry_after {
            details["retryAfter"] = retry_after.into();
        }
        details
    }
}
