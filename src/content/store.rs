//! Document collection backends.
//!
//! # Responsibilities
//! - Hold the documents of one logical collection
//! - Answer find-one / replace-one (upsert) / delete-many
//!
//! # Design Decisions
//! - Documents are opaque JSON values; typing happens in the accessor
//! - Replace is a single whole-document write, never a merge
//! - The file backend writes to a temporary file and renames it into place,
//!   so readers never observe a half-written collection

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::config::{StorageBackend, StorageConfig};

/// Errors surfaced by a collection backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A single logical collection of JSON documents.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// The first document in the collection, if any.
    async fn find_one(&self) -> Result<Option<Value>, StoreError>;

    /// Replace the first document with `doc`, inserting it if the collection is empty.
    async fn replace_one(&self, doc: Value) -> Result<(), StoreError>;

    /// Remove every document, returning how many were removed.
    async fn delete_many(&self) -> Result<usize, StoreError>;
}

/// Build the collection named by the storage configuration.
pub fn collection_from_config(config: &StorageConfig) -> Box<dyn DocumentCollection> {
    match config.backend {
        StorageBackend::Memory => Box::new(MemoryCollection::new()),
        StorageBackend::File => Box::new(FileCollection::new(&config.path)),
    }
}

/// Collection held in process memory.
#[derive(Default)]
pub struct MemoryCollection {
    docs: RwLock<Vec<Value>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn find_one(&self) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.read().await.first().cloned())
    }

    async fn replace_one(&self, doc: Value) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        match docs.first_mut() {
            Some(existing) => *existing = doc,
            None => docs.push(doc),
        }
        Ok(())
    }

    async fn delete_many(&self) -> Result<usize, StoreError> {
        let mut docs = self.docs.write().await;
        let removed = docs.len();
        docs.clear();
        Ok(removed)
    }
}

/// Collection persisted as a JSON array in a single file.
pub struct FileCollection {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileCollection {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Value>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, docs: &[Value]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(docs)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentCollection for FileCollection {
    async fn find_one(&self) -> Result<Option<Value>, StoreError> {
        Ok(self.load().await?.into_iter().next())
    }

    async fn replace_one(&self, doc: Value) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut docs = self.load().await?;
        match docs.first_mut() {
            Some(existing) => *existing = doc,
            None => docs.push(doc),
        }
        self.save(&docs).await?;
        tracing::debug!(path = ?self.path, "Collection written");
        Ok(())
    }

    async fn delete_many(&self) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let removed = self.load().await?.len();
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("portfolio-store-{}", uuid::Uuid::new_v4()))
            .join("portfolio.json")
    }

    #[tokio::test]
    async fn test_memory_upsert_keeps_single_document() {
        let collection = MemoryCollection::new();
        assert!(collection.find_one().await.unwrap().is_none());

        collection.replace_one(json!({"v": 1})).await.unwrap();
        collection.replace_one(json!({"v": 2})).await.unwrap();
        assert_eq!(collection.find_one().await.unwrap(), Some(json!({"v": 2})));
        assert_eq!(collection.docs.read().await.len(), 1);

        assert_eq!(collection.delete_many().await.unwrap(), 1);
        assert!(collection.find_one().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_collection_persists_across_instances() {
        let path = temp_path();

        let first = FileCollection::new(&path);
        first.replace_one(json!({"v": 1})).await.unwrap();
        first.replace_one(json!({"v": 2})).await.unwrap();

        let second = FileCollection::new(&path);
        assert_eq!(second.find_one().await.unwrap(), Some(json!({"v": 2})));

        assert_eq!(second.delete_many().await.unwrap(), 1);
        assert!(first.find_one().await.unwrap().is_none());
        assert_eq!(first.delete_many().await.unwrap(), 0);

        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).unwrap_or_default();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_leave_one_valid_document() {
        let path = temp_path();
        let collection = std::sync::Arc::new(FileCollection::new(&path));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..40 {
            let collection = collection.clone();
            tasks.spawn(async move {
                match i % 4 {
                    0 => collection.delete_many().await.map(|_| ()),
                    1 => collection.find_one().await.map(|_| ()),
                    _ => collection.replace_one(json!({"v": i})).await,
                }
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        if path.exists() {
            let docs: Vec<Value> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
            assert!(docs.len() <= 1);
        }
        collection.replace_one(json!({"v": "last"})).await.unwrap();
        assert_eq!(collection.find_one().await.unwrap(), Some(json!({"v": "last"})));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{ definitely not an array").unwrap();

        let collection = FileCollection::new(&path);
        assert!(matches!(
            collection.find_one().await,
            Err(StoreError::Serialization(_))
        ));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap_or_default();
    }
}
