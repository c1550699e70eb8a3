//! Content store backed by RedisJSON documents at `{prefix}:{collection}:{id}`.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde_json::Value;

use super::ContentRepository;
use crate::errors::MigrationError;
use crate::keys::{KeyContext, document_id_from_key};

const SCAN_COUNT: usize = 100;

pub struct RedisContentRepository {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisContentRepository {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    pub async fn connect(redis_url: &str, prefix: impl Into<String>) -> Result<Self, MigrationError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, prefix))
    }

    fn keys(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix)
    }
}

#[async_trait]
impl ContentRepository for RedisContentRepository {
    async fn document_ids(&mut self, collection: &str) -> Result<Vec<String>, MigrationError> {
        let pattern = self.keys().collection_pattern(collection);
        let mut ids = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut self.conn)
                .await?;

            ids.extend(keys.iter().map(|key| document_id_from_key(key).to_string()));

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        // SCAN may return a key more than once
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn load(&mut self, collection: &str, id: &str) -> Result<Option<Value>, MigrationError> {
        let key = self.keys().document(collection, id);
        let data: Option<String> = redis::cmd("JSON.GET")
            .arg(&key)
            .arg("$")
            .query_async(&mut self.conn)
            .await?;

        match data {
            Some(json_str) => {
                let values: Vec<Value> = serde_json::from_str(&json_str)?;
                Ok(values.into_iter().next())
            }
            None => Ok(None),
        }
    }

    async fn store(&mut self, collection: &str, id: &str, document: &Value) -> Result<(), MigrationError> {
        let key = self.keys().document(collection, id);
        let json_str = serde_json::to_string(document)?;

        let _: () = redis::cmd("JSON.SET")
            .arg(&key)
            .arg("$")
            .arg(&json_str)
            .query_async(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn remove(&mut self, collection: &str, id: &str) -> Result<bool, MigrationError> {
        let key = self.keys().document(collection, id);
        let deleted: u64 = self.conn.del(&key).await?;
        Ok(deleted > 0)
    }

    async fn move_document(&mut self, from: &str, id: &str, to: &str) -> Result<bool, MigrationError> {
        let source = self.keys().document(from, id);
        let target = self.keys().document(to, id);

        let exists: bool = self.conn.exists(&source).await?;
        if !exists {
            return Ok(false);
        }
        let _: () = self.conn.rename(&source, &target).await?;
        Ok(true)
    }
}
