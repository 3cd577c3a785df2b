//! HTTP handlers for `/examples`.

use axum::{
    extract::State,
    http::Method,
    routing::{get, post},
    Router,
};

use crate::example::commands::{CreateExample, DeleteExample, Deleted, UpdateExample};
use crate::example::dto::{CreateExampleDto, PaginationQuery, SearchQuery, UpdateExampleDto};
use crate::example::model::{Example, Page};
use crate::example::queries::{GetExampleById, ListExamples, SearchExamples};
use crate::example::service::ExampleService;
use crate::http::error::AppError;
use crate::http::request::{UuidPath, ValidatedJson, ValidatedQuery};
use crate::http::response::ApiResponse;

pub fn routes(service: ExampleService) -> Router {
    Router::new()
        .route("/examples", post(create_example).get(list_examples))
        .route("/examples/search", get(search_examples))
        .route(
            "/examples/{id}",
            get(get_example).put(update_example).delete(delete_example),
        )
        .with_state(service)
}

async fn create_example(
    State(service): State<ExampleService>,
    ValidatedJson(dto): ValidatedJson<CreateExampleDto>,
) -> Result<ApiResponse<Example>, AppError> {
    let example = service
        .create(CreateExample {
            name: dto.name,
            description: dto.description,
        })
        .await?;
    Ok(ApiResponse::created(example))
}

async fn list_examples(
    State(service): State<ExampleService>,
    ValidatedQuery(query): ValidatedQuery<PaginationQuery>,
) -> ApiResponse<Page<Example>> {
    let page = service
        .list(ListExamples {
            page: query.page,
            limit: query.limit,
        })
        .await;
    ApiResponse::list(page)
}

async fn search_examples(
    State(service): State<ExampleService>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> ApiResponse<Vec<Example>> {
    ApiResponse::list(service.search(SearchExamples { name: query.name }).await)
}

async fn get_example(
    State(service): State<ExampleService>,
    UuidPath(id): UuidPath,
) -> Result<ApiResponse<Example>, AppError> {
    let example = service.get(GetExampleById { id }).await?;
    Ok(ApiResponse::ok(example, &Method::GET))
}

async fn update_example(
    State(service): State<ExampleService>,
    UuidPath(id): UuidPath,
    ValidatedJson(dto): ValidatedJson<UpdateExampleDto>,
) -> Result<ApiResponse<Example>, AppError> {
    let example = service
        .update(UpdateExample {
            id,
            name: dto.name,
            description: dto.description,
        })
        .await?;
    Ok(ApiResponse::ok(example, &Method::PUT))
}

async fn delete_example(
    State(service): State<ExampleService>,
    UuidPath(id): UuidPath,
) -> Result<ApiResponse<Deleted>, AppError> {
    let deleted = service.delete(DeleteExample { id }).await?;
    Ok(ApiResponse::ok(deleted, &Method::DELETE))
}
