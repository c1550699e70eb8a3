use serde_json::Value;

use super::ContentRepository;
use crate::errors::MigrationError;

/// Edits applied to every document of one collection.
///
/// Operating on an empty or missing collection is a no-op.
pub struct CollectionAction<'c> {
    repository: &'c mut dyn ContentRepository,
    collection: String,
}

impl<'c> CollectionAction<'c> {
    pub fn new(repository: &'c mut dyn ContentRepository, collection: impl Into<String>) -> Self {
        Self {
            repository,
            collection: collection.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.collection
    }

    /// Remove every document. Returns how many were removed.
    pub async fn delete(&mut self) -> Result<usize, MigrationError> {
        let mut removed = 0;
        for id in self.repository.document_ids(&self.collection).await? {
            if self.repository.remove(&self.collection, &id).await? {
                removed += 1;
            }
        }
        log::debug!("deleted {removed} document(s) from '{}'", self.collection);
        Ok(removed)
    }

    /// Move every document to `new_name`. The action stays bound to the new name.
    pub async fn rename(&mut self, new_name: impl Into<String>) -> Result<usize, MigrationError> {
        let new_name = new_name.into();
        if new_name == self.collection {
            return Ok(0);
        }

        let mut moved = 0;
        for id in self.repository.document_ids(&self.collection).await? {
            if self.repository.move_document(&self.collection, &id, &new_name).await? {
                moved += 1;
            }
        }
        log::debug!("renamed '{}' to '{new_name}' ({moved} document(s))", self.collection);
        self.collection = new_name;
        Ok(moved)
    }

    /// Action helper for a field of this collection's documents.
    pub fn field(&mut self, name: impl Into<String>) -> FieldAction<'_> {
        FieldAction {
            repository: &mut *self.repository,
            collection: self.collection.clone(),
            field: name.into(),
        }
    }
}

/// Edits applied to one field across a collection.
///
/// Documents that are not JSON objects or do not carry the field are left
/// untouched.
pub struct FieldAction<'c> {
    repository: &'c mut dyn ContentRepository,
    collection: String,
    field: String,
}

impl FieldAction<'_> {
    pub fn name(&self) -> &str {
        &self.field
    }

    /// Drop the field. Returns how many documents changed.
    pub async fn delete(&mut self) -> Result<usize, MigrationError> {
        let field = self.field.clone();
        self.update_each(|object| object.remove(&field).is_some()).await
    }

    /// Rename the field, replacing any existing value under `new_name`.
    pub async fn rename(&mut self, new_name: impl Into<String>) -> Result<usize, MigrationError> {
        let new_name = new_name.into();
        if new_name == self.field {
            return Ok(0);
        }

        let field = self.field.clone();
        let changed = self
            .update_each(|object| match object.remove(&field) {
                Some(value) => {
                    object.insert(new_name.clone(), value);
                    true
                }
                None => false,
            })
            .await?;
        self.field = new_name;
        Ok(changed)
    }

    async fn update_each<F>(&mut self, mut edit: F) -> Result<usize, MigrationError>
    where
        F: FnMut(&mut serde_json::Map<String, Value>) -> bool + Send,
    {
        let mut changed = 0;
        for id in self.repository.document_ids(&self.collection).await? {
            let Some(mut document) = self.repository.load(&self.collection, &id).await? else {
                continue;
            };
            let Some(object) = document.as_object_mut() else {
                continue;
            };
            if edit(object) {
                self.repository.store(&self.collection, &id, &document).await?;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
