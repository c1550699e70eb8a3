//! Content store that migration bodies mutate.
//!
//! Documents are JSON values grouped into named collections (one collection
//! per content type). The runner treats the store as opaque: it only hands a
//! [`MigrationContext`] to each migration. The action helpers in this module
//! cover the common edits (dropping or renaming a collection, dropping or
//! renaming a field).

mod actions;
mod memory;
mod redis_store;

pub use actions::{CollectionAction, FieldAction};
pub use memory::MemoryContentRepository;
pub use redis_store::RedisContentRepository;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::MigrationError;

/// Document storage reachable from migrations.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Ids of every document in `collection`, sorted.
    async fn document_ids(&mut self, collection: &str) -> Result<Vec<String>, MigrationError>;

    async fn load(&mut self, collection: &str, id: &str) -> Result<Option<Value>, MigrationError>;

    async fn store(&mut self, collection: &str, id: &str, document: &Value) -> Result<(), MigrationError>;

    /// Returns whether a document was removed.
    async fn remove(&mut self, collection: &str, id: &str) -> Result<bool, MigrationError>;

    /// Move a document to another collection, keeping its id. Returns whether
    /// the source existed.
    async fn move_document(&mut self, from: &str, id: &str, to: &str) -> Result<bool, MigrationError> {
        let Some(document) = self.load(from, id).await? else {
            return Ok(false);
        };
        self.store(to, id, &document).await?;
        self.remove(from, id).await
    }
}

/// Context handed to each migration while it executes.
pub struct MigrationContext<'a> {
    repository: &'a mut dyn ContentRepository,
    number: u32,
    name: &'a str,
}

impl<'a> MigrationContext<'a> {
    pub fn new(repository: &'a mut dyn ContentRepository, number: u32, name: &'a str) -> Self {
        Self {
            repository,
            number,
            name,
        }
    }

    /// Number of the migration currently executing.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Name of the migration currently executing.
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn repository(&mut self) -> &mut dyn ContentRepository {
        &mut *self.repository
    }

    /// Action helper bound to the named collection.
    pub fn collection(&mut self, name: impl Into<String>) -> CollectionAction<'_> {
        CollectionAction::new(&mut *self.repository, name)
    }
}
