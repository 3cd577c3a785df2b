//! Example service.
//!
//! Write operations live in `commands.rs`, reads in `queries.rs`; both are
//! `impl` blocks on [`ExampleService`].

use std::sync::Arc;

use crate::example::repository::{ExampleRepository, RepositoryError};
use crate::http::error::AppError;

#[derive(Clone)]
pub struct ExampleService {
    pub(crate) repo: Arc<dyn ExampleRepository>,
}

impl ExampleService {
    pub fn new(repo: Arc<dyn ExampleRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn ExampleRepository> {
        &self.repo
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(_) => AppError::BadRequest(err.to_string()),
            other => AppError::internal(other),
        }
    }
}
