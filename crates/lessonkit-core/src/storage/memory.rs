//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::LessonDocument;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory storage for tests and previews.
///
/// Lessons are kept serialized, so a load goes through the same parse and
/// integrity check as a file on disk.
#[derive(Default)]
pub struct MemoryStorage {
    lessons: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw JSON under `id`, bypassing serialization.
    pub fn insert_raw(&self, id: impl Into<String>, json: impl Into<String>) -> StorageResult<()> {
        self.lessons
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?
            .insert(id.into(), json.into());
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &LessonDocument) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = serde_json::to_string(document);
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            self.insert_raw(id, json)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<LessonDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let json = {
                let lessons = self
                    .lessons
                    .read()
                    .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
                lessons.get(&id).cloned()
            };
            let json = json.ok_or_else(|| StorageError::NotFound(id.clone()))?;
            LessonDocument::from_json(&json).map_err(|e| StorageError::from_builder(&id, e))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.lessons
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?
                .remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let lessons = self
                .lessons
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
            Ok(lessons.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let lessons = self
                .lessons
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
            Ok(lessons.contains_key(&id))
        })
    }
}
