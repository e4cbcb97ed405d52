//! In-memory [`FormStore`] for tests and embedding.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use super::FormStore;
use crate::error::StoreError;

/// In-memory store keyed by `formId`.
///
/// Can be switched into an "unavailable" mode where every read fails, to
/// exercise the pipeline's best-effort lookup.
pub struct InMemoryFormStore {
    docs: RwLock<HashMap<String, Value>>,
    ready: AtomicBool,
    unavailable: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            ready: AtomicBool::new(false),
            unavailable: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }

    /// Insert or replace a document under `form_id`.
    pub fn insert(&self, form_id: impl Into<String>, doc: Value) {
        if let Ok(mut docs) = self.docs.write() {
            docs.insert(form_id.into(), doc);
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Number of `read` calls seen so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryFormStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FormStore for InMemoryFormStore {
    async fn ensure_ready(&self) -> Result<(), StoreError> {
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn read(&self, form_id: &str) -> Result<Value, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store marked unavailable".to_string()));
        }

        let docs = self
            .docs
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        docs.get(form_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(form_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_read() {
        let store = InMemoryFormStore::new();
        store.insert("f1", json!({"formId": "f1"}));

        assert_eq!(store.read("f1").await.unwrap(), json!({"formId": "f1"}));
        assert!(store.read("f2").await.unwrap_err().is_not_found());
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn test_ensure_ready_twice() {
        let store = InMemoryFormStore::new();
        assert!(store.is_empty());
        store.insert("f1", json!({}));
        store.ensure_ready().await.unwrap();
        store.ensure_ready().await.unwrap();
        assert!(store.is_ready());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_mode() {
        let store = InMemoryFormStore::new();
        store.insert("f1", json!({}));
        store.set_unavailable(true);

        let err = store.read("f1").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
