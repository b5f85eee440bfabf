//! Document store abstraction for persistence.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

use crate::scene::SceneSnapshot;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Store error: {0}")]
    Other(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Name given to documents created without one.
pub const DEFAULT_DOCUMENT_NAME: &str = "Untitled Canvas";

/// A persisted document: metadata plus the latest scene snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Display name.
    pub name: String,
    /// Creation time, epoch milliseconds.
    pub created_at: u64,
    /// Last write time, epoch milliseconds.
    pub updated_at: u64,
    /// Latest saved scene, None for a document never drawn on.
    pub scene: Option<SceneSnapshot>,
}

impl DocumentRecord {
    /// Fresh record with the default name and no scene.
    pub fn new() -> Self {
        let now = now_millis();
        Self {
            name: DEFAULT_DOCUMENT_NAME.to_string(),
            created_at: now,
            updated_at: now,
            scene: None,
        }
    }
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Current time as epoch milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Trait for document store backends.
///
/// `put_scene` has merge semantics: it updates the scene and bump
/// `updated_at` while preserving `name` and `created_at`, creating the
/// record first when the document does not exist yet. Loading an absent
/// document is an error; callers that want load-or-create go through
/// `create` on NotFound.
pub trait DocumentStore: Send + Sync {
    /// Load a document record.
    fn get(&self, id: &str) -> BoxFuture<'_, StoreResult<DocumentRecord>>;

    /// Create a fresh record for an id. Overwrites nothing: an existing
    /// record is returned as is.
    fn create(&self, id: &str) -> BoxFuture<'_, StoreResult<DocumentRecord>>;

    /// Write a scene snapshot into a record (merge write).
    fn put_scene(&self, id: &str, scene: &SceneSnapshot) -> BoxFuture<'_, StoreResult<()>>;

    /// Delete a document.
    fn delete(&self, id: &str) -> BoxFuture<'_, StoreResult<()>>;

    /// List all document IDs.
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<String>>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StoreResult<bool>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    // Simple blocking executor for tests
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
