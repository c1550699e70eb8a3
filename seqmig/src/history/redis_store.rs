//! Execution log persisted as a RedisJSON document.
//!
//! The document lives at the store name and has the shape
//! `{"entries": [ExecutedMigration, ...]}`.

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use super::{ExecutedMigration, ExecutionLog};
use crate::errors::MigrationError;

const EMPTY_LOG_DOCUMENT: &str = r#"{"entries":[]}"#;
const ENTRIES_PATH: &str = "$.entries";

/// RedisJSON-backed execution log.
pub struct RedisExecutionLog {
    conn: ConnectionManager,
    store_name: String,
}

impl RedisExecutionLog {
    pub fn new(conn: ConnectionManager, store_name: impl Into<String>) -> Self {
        Self {
            conn,
            store_name: store_name.into(),
        }
    }

    pub async fn connect(redis_url: &str, store_name: impl Into<String>) -> Result<Self, MigrationError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, store_name))
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }
}

#[async_trait]
impl ExecutionLog for RedisExecutionLog {
    async fn ensure_created(&mut self) -> Result<(), MigrationError> {
        // NX leaves an existing log untouched.
        let created: Option<String> = redis::cmd("JSON.SET")
            .arg(&self.store_name)
            .arg("$")
            .arg(EMPTY_LOG_DOCUMENT)
            .arg("NX")
            .query_async(&mut self.conn)
            .await?;

        if created.is_some() {
            log::debug!("created execution log store '{}'", self.store_name);
        }
        Ok(())
    }

    async fn entries(&mut self) -> Result<Vec<ExecutedMigration>, MigrationError> {
        let data: Option<String> = redis::cmd("JSON.GET")
            .arg(&self.store_name)
            .arg(ENTRIES_PATH)
            .query_async(&mut self.conn)
            .await?;

        match data {
            Some(json_str) => {
                // JSON.GET with a JSONPath returns an array of matches
                let matches: Vec<Vec<ExecutedMigration>> = serde_json::from_str(&json_str)?;
                Ok(matches.into_iter().next().unwrap_or_default())
            }
            None => Ok(Vec::new()),
        }
    }

    async fn append(&mut self, entry: ExecutedMigration) -> Result<(), MigrationError> {
        let entry_json = serde_json::to_string(&entry)?;

        // ARRAPPEND on a missing key is a server error; name the cause instead.
        let exists: bool = redis::cmd("EXISTS")
            .arg(&self.store_name)
            .query_async(&mut self.conn)
            .await?;
        if !exists {
            return Err(MigrationError::Other {
                message: format!(
                    "execution log store '{}' is missing; call ensure_created first",
                    self.store_name
                )
                .into(),
            });
        }

        let _lengths: Vec<Option<i64>> = redis::cmd("JSON.ARRAPPEND")
            .arg(&self.store_name)
            .arg(ENTRIES_PATH)
            .arg(&entry_json)
            .query_async(&mut self.conn)
            .await?;
        Ok(())
    }
}
