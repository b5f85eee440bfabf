//! In-memory store implementation.

use super::{BoxFuture, DocumentRecord, DocumentStore, StoreError, StoreResult, now_millis};
use crate::scene::SceneSnapshot;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, DocumentRecord>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, id: &str) -> BoxFuture<'_, StoreResult<DocumentRecord>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self
                .documents
                .read()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            docs.get(&id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id))
        })
    }

    fn create(&self, id: &str) -> BoxFuture<'_, StoreResult<DocumentRecord>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut docs = self
                .documents
                .write()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            Ok(docs.entry(id).or_insert_with(DocumentRecord::new).clone())
        })
    }

    fn put_scene(&self, id: &str, scene: &SceneSnapshot) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.to_string();
        let scene = scene.clone();
        Box::pin(async move {
            let mut docs = self
                .documents
                .write()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            let record = docs.entry(id).or_insert_with(DocumentRecord::new);
            record.scene = Some(scene);
            record.updated_at = now_millis();
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut docs = self
                .documents
                .write()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            docs.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self
                .documents
                .read()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            Ok(docs.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StoreResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self
                .documents
                .read()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            Ok(docs.contains_key(&id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DEFAULT_DOCUMENT_NAME, block_on};

    fn snapshot(n: u64) -> SceneSnapshot {
        SceneSnapshot::from_json_str(&format!("{{\"edit\": {n}}}")).unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let store = MemoryStore::new();
        let created = block_on(store.create("doc-1")).unwrap();
        assert_eq!(created.name, DEFAULT_DOCUMENT_NAME);
        assert!(created.scene.is_none());

        let loaded = block_on(store.get("doc-1")).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        let result = block_on(store.get("nonexistent"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_create_does_not_overwrite() {
        let store = MemoryStore::new();
        block_on(store.create("doc-1")).unwrap();
        block_on(store.put_scene("doc-1", &snapshot(1))).unwrap();

        let again = block_on(store.create("doc-1")).unwrap();
        assert_eq!(again.scene, Some(snapshot(1)));
    }

    #[test]
    fn test_put_scene_merges() {
        let store = MemoryStore::new();
        let created = block_on(store.create("doc-1")).unwrap();

        block_on(store.put_scene("doc-1", &snapshot(7))).unwrap();
        let loaded = block_on(store.get("doc-1")).unwrap();

        assert_eq!(loaded.scene, Some(snapshot(7)));
        assert_eq!(loaded.name, created.name);
        assert_eq!(loaded.created_at, created.created_at);
        assert!(loaded.updated_at >= created.updated_at);
    }

    #[test]
    fn test_put_scene_creates_missing_record() {
        let store = MemoryStore::new();
        block_on(store.put_scene("doc-1", &snapshot(1))).unwrap();

        let loaded = block_on(store.get("doc-1")).unwrap();
        assert_eq!(loaded.name, DEFAULT_DOCUMENT_NAME);
        assert_eq!(loaded.scene, Some(snapshot(1)));
    }

    #[test]
    fn test_exists_and_delete() {
        let store = MemoryStore::new();
        assert!(!block_on(store.exists("doc-1")).unwrap());

        block_on(store.create("doc-1")).unwrap();
        assert!(block_on(store.exists("doc-1")).unwrap());

        block_on(store.delete("doc-1")).unwrap();
        assert!(!block_on(store.exists("doc-1")).unwrap());
        assert!(block_on(store.list()).unwrap().is_empty());
    }
}
