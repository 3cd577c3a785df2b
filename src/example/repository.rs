//! Example storage.
//!
//! # Responsibilities
//! - Keep example records, unique by name
//! - Answer lookups, name search and newest-first pages
//! - Optionally mirror the store to a JSON file after every write
//! - Leave the in-memory store untouched when that file write fails
//!
//! # Design Decisions
//! - Storage sits behind [`ExampleRepository`] so a database-backed store can
//!   be dropped in without touching the command and query handlers
//! - Name uniqueness is enforced inside the write lock, so two concurrent
//!   creates with the same name cannot both succeed
//! - A write builds the candidate record set, saves it to a temp file off the
//!   executor and renames it into place, then commits in memory

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::example::model::Example;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Example with name '{0}' already exists")]
    Duplicate(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait ExampleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Option<Example>;

    async fn find_by_name(&self, name: &str) -> Option<Example>;

    /// Case-insensitive substring match on name, newest first.
    async fn search_by_name(&self, needle: &str) -> Vec<Example>;

    /// Newest-first page and the total record count.
    async fn list_page(&self, offset: usize, limit: usize) -> (Vec<Example>, usize);

    /// Fails with [`RepositoryError::Duplicate`] when the name is taken.
    async fn insert(&self, example: Example) -> Result<Example, RepositoryError>;

    /// Replace the stored record with the same id. Fails with
    /// [`RepositoryError::Duplicate`] when the new name belongs to another record.
    async fn update(&self, example: Example) -> Result<Option<Example>, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;

    async fn count(&self) -> usize;
}

#[derive(Default)]
struct Store {
    by_id: HashMap<Uuid, Example>,
    /// name → id
    names: HashMap<String, Uuid>,
}

impl Store {
    fn from_records(records: Vec<Example>) -> Self {
        let mut store = Store::default();
        for example in records {
            store.names.insert(example.name.clone(), example.id);
            store.by_id.insert(example.id, example);
        }
        store
    }

    fn newest_first<'a>(&self, records: impl Iterator<Item = &'a Example>) -> Vec<Example> {
        sort_newest_first(records.cloned().collect())
    }

    /// Every record as it would be after dropping `without` and adding `with`.
    fn candidate(&self, without: Option<Uuid>, with: Option<&Example>) -> Vec<Example> {
        let mut records: Vec<Example> = self
            .by_id
            .values()
            .filter(|example| Some(example.id) != without)
            .cloned()
            .collect();
        records.extend(with.cloned());
        sort_newest_first(records)
    }
}

fn sort_newest_first(mut records: Vec<Example>) -> Vec<Example> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)));
    records
}

/// Write `records` next to `path` and rename over it.
fn write_records(path: &Path, records: &[Example]) -> Result<(), RepositoryError> {
    let tmp = path.with_extension("json.tmp");
    let written = File::create(&tmp)
        .map_err(RepositoryError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.flush()?;
            Ok(())
        })
        .and_then(|()| fs::rename(&tmp, path).map_err(RepositoryError::from));

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

/// In-process store with optional JSON file persistence.
pub struct InMemoryExampleRepository {
    store: RwLock<Store>,
    persistence_path: Option<PathBuf>,
}

impl Default for InMemoryExampleRepository {
    fn default() -> Self {
        Self::new(None)
    }
}

impl InMemoryExampleRepository {
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            persistence_path,
        }
    }

    /// Load records from `path` if it exists; writes are saved back to it.
    pub fn load_from_file(path: &Path) -> Result<Self, RepositoryError> {
        let mut records = Vec::new();
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            records = serde_json::from_reader(reader)?;
            tracing::info!(path = %path.display(), count = records.len(), "Loaded examples from file");
        }

        Ok(Self {
            store: RwLock::new(Store::from_records(records)),
            persistence_path: Some(path.to_path_buf()),
        })
    }

    /// Write all records to the persistence file, if one is configured.
    pub async fn flush(&self) -> Result<(), RepositoryError> {
        let store = self.store.read().await;
        self.save(|| store.candidate(None, None)).await
    }

    /// Persist the record set produced by `records`. Callers hold the write
    /// lock so saves land in the same order as the commits they precede.
    async fn save<F>(&self, records: F) -> Result<(), RepositoryError>
    where
        F: FnOnce() -> Vec<Example>,
    {
        let Some(path) = self.persistence_path.clone() else {
            return Ok(());
        };
        let records = records();
        let count = records.len();

        tokio::task::spawn_blocking(move || write_records(&path, &records).map(|()| path))
            .await
            .map_err(|e| RepositoryError::Io(std::io::Error::other(e)))?
            .map(|path| {
                tracing::debug!(path = %path.display(), count, "Saved examples to file");
            })
    }
}

#[async_trait]
impl ExampleRepository for InMemoryExampleRepository {
    async fn find_by_id(&self, id: Uuid) -> Option<Example> {
        self.store.read().await.by_id.get(&id).cloned()
    }

    async fn find_by_name(&self, name: &str) -> Option<Example> {
        let store = self.store.read().await;
        store.names.get(name).and_then(|id| store.by_id.get(id)).cloned()
    }

    async fn search_by_name(&self, needle: &str) -> Vec<Example> {
        let needle = needle.to_lowercase();
        let store = self.store.read().await;
        store.newest_first(
            store
                .by_id
                .values()
                .filter(|example| example.name.to_lowercase().contains(&needle)),
        )
    }

    async fn list_page(&self, offset: usize, limit: usize) -> (Vec<Example>, usize) {
        let store = self.store.read().await;
        let total = store.by_id.len();
        let page = store
            .newest_first(store.by_id.values())
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        (page, total)
    }

    async fn insert(&self, example: Example) -> Result<Example, RepositoryError> {
        let mut store = self.store.write().await;
        if store.names.contains_key(&example.name) {
            return Err(RepositoryError::Duplicate(example.name));
        }
        self.save(|| store.candidate(None, Some(&example))).await?;

        store.names.insert(example.name.clone(), example.id);
        store.by_id.insert(example.id, example.clone());
        Ok(example)
    }

    async fn update(&self, example: Example) -> Result<Option<Example>, RepositoryError> {
        let mut store = self.store.write().await;
        let Some(previous_name) = store.by_id.get(&example.id).map(|e| e.name.clone()) else {
            return Ok(None);
        };

        let renamed = previous_name != example.name;
        if renamed && store.names.contains_key(&example.name) {
            return Err(RepositoryError::Duplicate(example.name));
        }

        self.save(|| store.candidate(Some(example.id), Some(&example))).await?;

        if renamed {
            store.names.remove(&previous_name);
            store.names.insert(example.name.clone(), example.id);
        }
        store.by_id.insert(example.id, example.clone());
        Ok(Some(example))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut store = self.store.write().await;
        if !store.by_id.contains_key(&id) {
            return Ok(false);
        }

        self.save(|| store.candidate(Some(id), None)).await?;

        if let Some(removed) = store.by_id.remove(&id) {
            store.names.remove(&removed.name);
        }
        Ok(true)
    }

    async fn count(&self) -> usize {
        self.store.read().await.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn example_at(name: &str, minutes_ago: i64) -> Example {
        let mut example = Example::new(name.to_string(), None);
        example.created_at = Utc::now() - Duration::minutes(minutes_ago);
        example.updated_at = example.created_at;
        example
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_names() {
        let repo = InMemoryExampleRepository::default();
        repo.insert(example_at("First Example", 0)).await.unwrap();

        let err = repo.insert(example_at("First Example", 0)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(name) if name == "First Example"));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_list_page_newest_first() {
        let repo = InMemoryExampleRepository::default();
        repo.insert(example_at("Oldest", 30)).await.unwrap();
        repo.insert(example_at("Newest", 0)).await.unwrap();
        repo.insert(example_at("Middle", 10)).await.unwrap();

        let (page, total) = repo.list_page(0, 2).await;
        assert_eq!(total, 3);
        let names: Vec<_> = page.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Newest", "Middle"]);

        let (page, _) = repo.list_page(2, 2).await;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Oldest");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let repo = InMemoryExampleRepository::default();
        repo.insert(example_at("First Example", 1)).await.unwrap();
        repo.insert(example_at("Second Example", 0)).await.unwrap();
        repo.insert(example_at("Other", 0)).await.unwrap();

        let found = repo.search_by_name("EXAMPLE").await;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Second Example");
        assert!(repo.search_by_name("missing").await.is_empty());
    }

    #[tokio::test]
    async fn test_update_renames_and_guards_names() {
        let repo = InMemoryExampleRepository::default();
        let first = repo.insert(example_at("First", 1)).await.unwrap();
        repo.insert(example_at("Second", 0)).await.unwrap();

        let mut renamed = first.clone();
        renamed.name = "Second".into();
        assert!(matches!(repo.update(renamed).await, Err(RepositoryError::Duplicate(_))));

        let mut renamed = first.clone();
        renamed.name = "Renamed".into();
        repo.update(renamed).await.unwrap();
        assert!(repo.find_by_name("First").await.is_none());
        assert_eq!(repo.find_by_name("Renamed").await.map(|e| e.id), Some(first.id));

        let missing = example_at("Ghost", 0);
        assert!(repo.update(missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryExampleRepository::default();
        let example = repo.insert(example_at("First", 0)).await.unwrap();

        assert!(repo.delete(example.id).await.unwrap());
        assert!(!repo.delete(example.id).await.unwrap());
        assert!(repo.find_by_name("First").await.is_none());
    }

    #[tokio::test]
    async fn test_file_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.json");

        let repo = InMemoryExampleRepository::load_from_file(&path).unwrap();
        let saved = repo.insert(example_at("Persisted", 0)).await.unwrap();

        let reloaded = InMemoryExampleRepository::load_from_file(&path).unwrap();
        assert_eq!(reloaded.find_by_id(saved.id).await, Some(saved));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.json");
        let repo = InMemoryExampleRepository::load_from_file(&path).unwrap();
        let kept = repo.insert(example_at("Kept", 1)).await.unwrap();

        // Remove the directory so every later write fails.
        dir.close().unwrap();

        assert!(matches!(
            repo.insert(example_at("Ghost", 0)).await,
            Err(RepositoryError::Io(_))
        ));
        assert_eq!(repo.count().await, 1);
        assert!(repo.find_by_name("Ghost").await.is_none());

        let mut renamed = kept.clone();
        renamed.name = "Renamed".into();
        assert!(repo.update(renamed).await.is_err());
        assert_eq!(repo.find_by_id(kept.id).await.map(|e| e.name), Some("Kept".to_string()));
        assert!(repo.find_by_name("Kept").await.is_some());

        assert!(repo.delete(kept.id).await.is_err());
        assert_eq!(repo.find_by_id(kept.id).await, Some(kept));
    }

    #[tokio::test]
    async fn test_save_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.json");
        let repo = InMemoryExampleRepository::load_from_file(&path).unwrap();

        let first = repo.insert(example_at("First", 1)).await.unwrap();
        repo.insert(example_at("Second", 0)).await.unwrap();
        repo.delete(first.id).await.unwrap();

        let records: Vec<Example> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Second");
        assert!(!path.with_extension("json.tmp").exists());
    }
}
