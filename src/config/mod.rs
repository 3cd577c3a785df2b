//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config.toml (optional)
//!     → loader.rs (parse & deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the security policy atomically
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Environment variables override file values
//! - Only the security policy is hot-reloaded; everything else needs a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::AppConfig;
pub use schema::{
    AppSection, AuthConfig, CacheConfig, DatabaseConfig, ObservabilityConfig, RateLimitConfig,
    SecurityConfig, TimeoutConfig,
};
pub use watcher::ConfigWatcher;
