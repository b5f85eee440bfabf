//! File-based store implementation for native platforms.

use super::{
    BoxFuture, DocumentRecord, DocumentStore, StoreError, StoreResult, now_millis,
};
use crate::scene::SceneSnapshot;
use std::fs;
use std::path::PathBuf;

/// File-based store.
///
/// Stores one JSON file per document in a base directory.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a file store over the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StoreResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StoreError::Io(format!("Failed to create store directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a file store in the default location
    /// (`<data dir>/inkboard/documents`).
    pub fn default_location() -> StoreResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StoreError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("inkboard").join("documents"))
    }

    /// Get the file path for a document ID.
    fn document_path(&self, id: &str) -> PathBuf {
        // Sanitize ID to be safe for filenames
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn read_record(&self, path: &PathBuf) -> StoreResult<DocumentRecord> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn write_record(&self, path: &PathBuf, record: &DocumentRecord) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(path, json).map_err(|e| {
            StoreError::Io(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

impl DocumentStore for FileStore {
    fn get(&self, id: &str) -> BoxFuture<'_, StoreResult<DocumentRecord>> {
        let path = self.document_path(id);
        let id_owned = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StoreError::NotFound(id_owned));
            }
            self.read_record(&path)
        })
    }

    fn create(&self, id: &str) -> BoxFuture<'_, StoreResult<DocumentRecord>> {
        let path = self.document_path(id);
        Box::pin(async move {
            if path.exists() {
                return self.read_record(&path);
            }
            let record = DocumentRecord::new();
            self.write_record(&path, &record)?;
            Ok(record)
        })
    }

    fn put_scene(&self, id: &str, scene: &SceneSnapshot) -> BoxFuture<'_, StoreResult<()>> {
        let path = self.document_path(id);
        let scene = scene.clone();
        Box::pin(async move {
            let mut record = if path.exists() {
                self.read_record(&path)?
            } else {
                DocumentRecord::new()
            };
            record.scene = Some(scene);
            record.updated_at = now_millis();
            self.write_record(&path, &record)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StoreResult<()>> {
        let path = self.document_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StoreError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StoreError::Io(format!("Failed to read directory: {}", e)))?;

            let mut ids = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                        ids.push(name.to_string());
                    }
                }
            }
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StoreResult<bool>> {
        let path = self.document_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}
