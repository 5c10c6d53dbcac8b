//! File-based storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::config::BuilderConfig;
use crate::document::LessonDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each lesson as `<id>.json` in one directory.
pub struct FileStorage {
    base_path: PathBuf,
    pretty: bool,
}

impl FileStorage {
    /// Open storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::Io(format!("Failed to create {}: {e}", base_path.display()))
        })?;
        Ok(Self {
            base_path,
            pretty: true,
        })
    }

    /// Open the platform default location.
    ///
    /// On Unix: `~/.local/share/lessonkit/lessons/`
    /// On Windows: `%LOCALAPPDATA%\lessonkit\lessons\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("lessonkit").join("lessons"))
    }

    /// Open the directory named by the config, or the default location.
    pub fn from_config(config: &BuilderConfig) -> StorageResult<Self> {
        let storage = match &config.storage_dir {
            Some(dir) => Self::new(dir.clone())?,
            None => Self::default_location()?,
        };
        Ok(storage.pretty(config.pretty_json))
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn lesson_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }

    fn encode(&self, document: &LessonDocument) -> StorageResult<String> {
        let json = if self.pretty {
            document.to_json()
        } else {
            serde_json::to_string(document)
        };
        json.map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &LessonDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.lesson_path(id);
        let json = self.encode(document);
        Box::pin(async move {
            let json = json?;
            // Write next to the target and rename, so a crash never leaves half a lesson.
            let staging = path.with_extension("json.tmp");
            fs::write(&staging, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {e}", staging.display()))
            })?;
            fs::rename(&staging, &path).map_err(|e| {
                StorageError::Io(format!("Failed to replace {}: {e}", path.display()))
            })?;
            log::debug!("Saved lesson to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<LessonDocument>> {
        let path = self.lesson_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {e}", path.display()))
            })?;
            LessonDocument::from_json(&json).map_err(|e| StorageError::from_builder(&id, e))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.lesson_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {e}", path.display()))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let entries = fs::read_dir(&self.base_path)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {e}")))?;

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.lesson_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertyBag;
    use crate::registry::ElementKind;
    use pollster::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let mut doc = LessonDocument::new();
        doc.name = "Fractions".to_string();
        let zone = doc.create_element(ElementKind::DragDropWidget, PropertyBag::new());
        let img = doc.create_element(ElementKind::StandaloneImage, PropertyBag::new());
        doc.attach(zone, img, Some(kurbo::Point::new(5.0, 6.0))).unwrap();

        block_on(storage.save("fractions", &doc)).unwrap();
        let loaded = block_on(storage.load("fractions")).unwrap();

        assert_eq!(loaded.name, "Fractions");
        assert_eq!(loaded.owner_of(img), Some(zone));
        assert!(!dir.path().join("fractions.json.tmp").exists());
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_list_skips_other_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let doc = LessonDocument::new();
        block_on(storage.save("lesson2", &doc)).unwrap();
        block_on(storage.save("lesson1", &doc)).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list, vec!["lesson1".to_string(), "lesson2".to_string()]);
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("test", &LessonDocument::new())).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());
        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let doc = LessonDocument::new();
        block_on(storage.save("unit/1:intro", &doc)).unwrap();

        assert!(dir.path().join("unit_1_intro.json").exists());
        let loaded = block_on(storage.load("unit/1:intro")).unwrap();
        assert_eq!(loaded.id, doc.id);
    }

    #[test]
    fn test_from_config_compact_output() {
        let dir = tempdir().unwrap();
        let config = BuilderConfig {
            storage_dir: Some(dir.path().join("lessons")),
            pretty_json: false,
            ..BuilderConfig::default()
        };
        let storage = FileStorage::from_config(&config).unwrap();

        block_on(storage.save("compact", &LessonDocument::new())).unwrap();
        let raw = fs::read_to_string(dir.path().join("lessons").join("compact.json")).unwrap();
        assert!(!raw.contains('\n'));
    }
}
