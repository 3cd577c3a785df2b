//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware/ (logging, timeout, response cache)
//!     → request.rs (validated extractors)
//!     → example handlers
//!     → response.rs (success envelope) / error.rs (error envelope)
//!     → Send to client
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::AppError;
pub use response::ApiResponse;
pub use server::HttpServer;
