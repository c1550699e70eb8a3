//! Execution log: the durable, append-only record of applied migrations.
//!
//! - `ExecutedMigration` - one log entry
//! - `ExecutionLog` - storage seam used by the runner
//! - `MemoryExecutionLog` - in-process log
//! - `RedisExecutionLog` - RedisJSON-backed log

mod memory;
mod redis_store;

pub use memory::MemoryExecutionLog;
pub use redis_store::RedisExecutionLog;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::MigrationError;

/// Default name of the persisted log collection.
pub const DEFAULT_STORE_NAME: &str = "seqmig:executed";

/// Applied migration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedMigration {
    /// Migration number (e.g. 3 for `Migration3`)
    pub number: u32,
    /// Migration type name at the time it ran
    pub name: String,
    /// When the migration finished
    pub applied_at: DateTime<Utc>,
    /// Execution time in milliseconds
    #[serde(default)]
    pub execution_time_ms: u64,
}

impl ExecutedMigration {
    pub fn new(number: u32, name: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            number,
            name: name.into(),
            applied_at: Utc::now(),
            execution_time_ms,
        }
    }
}

/// Append-only store of executed migrations.
///
/// Implementations never delete entries. Each `append` is its own atomic
/// write; no transaction spans a run.
#[async_trait]
pub trait ExecutionLog: Send {
    /// Create the backing collection if it does not exist. Idempotent.
    async fn ensure_created(&mut self) -> Result<(), MigrationError>;

    /// All entries in insertion order.
    async fn entries(&mut self) -> Result<Vec<ExecutedMigration>, MigrationError>;

    async fn append(&mut self, entry: ExecutedMigration) -> Result<(), MigrationError>;

    /// Highest recorded number, `None` when nothing has run.
    async fn last_applied(&mut self) -> Result<Option<u32>, MigrationError> {
        Ok(self.entries().await?.iter().map(|entry| entry.number).max())
    }
}
