//! Security-hardened CRUD API service library.

pub mod cache;
pub mod config;
pub mod example;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
