//! Read operations.

use uuid::Uuid;

use crate::example::commands::not_found;
use crate::example::model::{Example, Page};
use crate::example::service::ExampleService;
use crate::http::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct GetExampleById {
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy)]
pub struct ListExamples {
    pub page: usize,
    pub limit: usize,
}

impl Default for ListExamples {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

#[derive(Debug, Clone)]
pub struct SearchExamples {
    pub name: String,
}

impl ExampleService {
    pub async fn get(&self, query: GetExampleById) -> Result<Example, AppError> {
        self.repo
            .find_by_id(query.id)
            .await
            .ok_or_else(|| not_found(query.id))
    }

    pub async fn list(&self, query: ListExamples) -> Page<Example> {
        let page = query.page.max(1);
        let limit = query.limit.max(1);
        let offset = (page - 1).saturating_mul(limit);
        let (data, total) = self.repo.list_page(offset, limit).await;
        Page::new(data, total, page, limit)
    }

    pub async fn search(&self, query: SearchExamples) -> Vec<Example> {
        self.repo.search_by_name(&query.name).await
    }
}
