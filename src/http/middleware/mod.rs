//! Cross-cutting HTTP middleware.

pub mod cache;
pub mod logging;
pub mod timeout;

pub use cache::{response_cache, CacheState};
pub use logging::log_requests;
pub use timeout::request_timeout;
