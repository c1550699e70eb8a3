use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::ContentRepository;
use crate::errors::MigrationError;

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// In-process content store. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentRepository {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, id: &str, document: Value) {
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.lock().get(collection).and_then(|docs| docs.get(id)).cloned()
    }

    /// Every `(id, document)` pair of a collection, sorted by id.
    pub fn documents(&self, collection: &str) -> Vec<(String, Value)> {
        self.lock()
            .get(collection)
            .map(|docs| docs.iter().map(|(id, doc)| (id.clone(), doc.clone())).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.collections.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ContentRepository for MemoryContentRepository {
    async fn document_ids(&mut self, collection: &str) -> Result<Vec<String>, MigrationError> {
        Ok(self
            .lock()
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn load(&mut self, collection: &str, id: &str) -> Result<Option<Value>, MigrationError> {
        Ok(self.get(collection, id))
    }

    async fn store(&mut self, collection: &str, id: &str, document: &Value) -> Result<(), MigrationError> {
        self.insert(collection, id, document.clone());
        Ok(())
    }

    async fn remove(&mut self, collection: &str, id: &str) -> Result<bool, MigrationError> {
        let mut collections = self.lock();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let removed = docs.remove(id).is_some();
        if docs.is_empty() {
            collections.remove(collection);
        }
        Ok(removed)
    }
}
