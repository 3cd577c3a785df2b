//! Write operations.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::example::model::Example;
use crate::example::service::ExampleService;
use crate::http::error::AppError;

#[derive(Debug, Clone)]
pub struct CreateExample {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateExample {
    pub id: Uuid,
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteExample {
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

pub(crate) fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Example with ID {id} not found"))
}

impl ExampleService {
    pub async fn create(&self, command: CreateExample) -> Result<Example, AppError> {
        let example = self
            .repo
            .insert(Example::new(command.name, command.description))
            .await?;
        tracing::info!(id = %example.id, name = %example.name, "Example created");
        Ok(example)
    }

    pub async fn update(&self, command: UpdateExample) -> Result<Example, AppError> {
        let mut example = self
            .repo
            .find_by_id(command.id)
            .await
            .ok_or_else(|| not_found(command.id))?;

        if let Some(name) = command.name {
            example.name = name;
        }
        if let Some(description) = command.description {
            example.description = description;
        }
        example.updated_at = Utc::now();

        let updated = self
            .repo
            .update(example)
            .await?
            .ok_or_else(|| not_found(command.id))?;
        tracing::info!(id = %updated.id, "Example updated");
        Ok(updated)
    }

    pub async fn delete(&self, command: DeleteExample) -> Result<Deleted, AppError> {
        if !self.repo.delete(command.id).await? {
            return Err(not_found(command.id));
        }
        tracing::info!(id = %command.id, "Example deleted");
        Ok(Deleted { id: command.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::example::repository::InMemoryExampleRepository;

    fn service() -> ExampleService {
        ExampleService::new(Arc::new(InMemoryExampleRepository::default()))
    }

    fn create(name: &str) -> CreateExample {
        CreateExample {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_create_is_bad_request() {
        let service = service();
        service.create(create("First Example")).await.unwrap();

        let err = service.create(create("First Example")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.to_string(), "Example with name 'First Example' already exists");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let id = Uuid::new_v4();
        let err = service()
            .update(UpdateExample {
                id,
                name: Some("Renamed".into()),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), format!("Example with ID {id} not found"));
    }

    #[tokio::test]
    async fn test_update_applies_fields_and_bumps_timestamp() {
        let service = service();
        let created = service.create(create("First Example")).await.unwrap();

        let updated = service
            .update(UpdateExample {
                id: created.id,
                name: None,
                description: Some(Some("Now described".into())),
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "First Example");
        assert_eq!(updated.description.as_deref(), Some("Now described"));
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_can_clear_description() {
        let service = service();
        let created = service
            .create(CreateExample {
                name: "First Example".into(),
                description: Some("Old".into()),
            })
            .await
            .unwrap();

        let kept = service
            .update(UpdateExample {
                id: created.id,
                name: Some("Renamed".into()),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(kept.description.as_deref(), Some("Old"));

        let cleared = service
            .update(UpdateExample {
                id: created.id,
                name: None,
                description: Some(None),
            })
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.name, "Renamed");
    }

    #[tokio::test]
    async fn test_rename_onto_existing_name_fails() {
        let service = service();
        let first = service.create(create("First Example")).await.unwrap();
        service.create(create("Second Example")).await.unwrap();

        let err = service
            .update(UpdateExample {
                id: first.id,
                name: Some("Second Example".into()),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();
        let created = service.create(create("First Example")).await.unwrap();

        let deleted = service.delete(DeleteExample { id: created.id }).await.unwrap();
        assert_eq!(deleted.id, created.id);

        let err = service.delete(DeleteExample { id: created.id }).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
