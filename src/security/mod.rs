//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → filter.rs (middleware, runs the checks below in order)
//!         → policy.rs (host, User-Agent, IP, origin, header checks)
//!         → rate_limit.rs (per-IP fixed window)
//!         → limits.rs (declared and buffered size)
//!         → scanner.rs + patterns.rs (body, query and URL signatures)
//!     → access_control.rs (bearer token, when enabled)
//!     → handlers
//! Outgoing response:
//!     → headers.rs (hardening headers on every response)
//! ```
//!
//! # Design Decisions
//! - Fail closed: the first failing check rejects the request
//! - Every rejection is a [`SecurityViolation`] with a stable code
//! - Policy is swapped atomically on config reload

pub mod access_control;
pub mod filter;
pub mod headers;
pub mod limits;
pub mod patterns;
pub mod policy;
pub mod rate_limit;
pub mod scanner;
pub mod violation;

pub use access_control::{require_auth, AuthError, Claims, TokenValidator};
pub use filter::{security_filter, SecurityState};
pub use policy::SecurityPolicy;
pub use rate_limit::{InMemoryRateLimitStore, RateLimitStore, RateLimiter};
pub use violation::{SecurityViolation, Severity, ViolationKind};
