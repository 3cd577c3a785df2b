//! Sample data for fresh stores.

use crate::example::commands::CreateExample;
use crate::example::service::ExampleService;
use crate::http::error::AppError;

const SAMPLES: [(&str, &str); 3] = [
    ("First Example", "This is the first example item"),
    ("Second Example", "This is the second example item"),
    ("Third Example", "This is the third example item"),
];

/// Insert the sample records when the store is empty. Returns how many were
/// inserted.
pub async fn seed_examples(service: &ExampleService) -> Result<usize, AppError> {
    let existing = service.repository().count().await;
    if existing > 0 {
        tracing::info!(existing, "Example data already exists, skipping seeding");
        return Ok(0);
    }

    for (name, description) in SAMPLES {
        let example = service
            .create(CreateExample {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
        tracing::info!(id = %example.id, name = %example.name, "Seeded example");
    }

    Ok(SAMPLES.len())
}
