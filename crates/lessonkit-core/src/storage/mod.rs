//! Persistence of lesson documents.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::document::LessonDocument;
use crate::error::BuilderError;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Lesson not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The stored lesson parsed but breaks a document invariant.
    #[error("Invalid lesson {id}: {source}")]
    Invalid { id: String, source: BuilderError },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    /// Map a document parse failure for lesson `id`.
    fn from_builder(id: &str, error: BuilderError) -> Self {
        match error {
            BuilderError::Serialization(msg) => Self::Serialization(format!("{id}: {msg}")),
            source => Self::Invalid {
                id: id.to_string(),
                source,
            },
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future returned by storage backends.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A backend that keeps lesson documents by id.
///
/// Loaded documents are always checked for structural integrity, so a
/// backend never hands out a lesson the editor could not have produced.
pub trait Storage: Send + Sync {
    fn save(&self, id: &str, document: &LessonDocument) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<LessonDocument>>;

    /// Delete a lesson. Deleting a missing lesson is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// All stored lesson ids, sorted.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
