//! Example resource: the CRUD module served under `/examples`.
//!
//! # Data Flow
//! ```text
//! handlers.rs (extract + validate DTOs)
//!     → commands.rs / queries.rs (existence and duplicate-name checks)
//!     → repository.rs (storage, optional JSON file)
//! ```

pub mod commands;
pub mod dto;
pub mod handlers;
pub mod model;
pub mod queries;
pub mod repository;
pub mod seed;
pub mod service;

pub use model::{Example, Page};
pub use repository::{ExampleRepository, InMemoryExampleRepository, RepositoryError};
pub use seed::seed_examples;
pub use service::ExampleService;
