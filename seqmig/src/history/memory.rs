use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{ExecutedMigration, ExecutionLog};
use crate::errors::MigrationError;

/// In-process execution log.
///
/// Clones share the same entries, so a caller can keep a handle to inspect
/// what a runner recorded.
#[derive(Debug, Clone, Default)]
pub struct MemoryExecutionLog {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    created: bool,
    entries: Vec<ExecutedMigration>,
}

impl MemoryExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing entries, as if a previous run had recorded them.
    pub fn with_entries(entries: impl IntoIterator<Item = ExecutedMigration>) -> Self {
        let log = Self::new();
        {
            let mut state = log.lock();
            state.created = true;
            state.entries.extend(entries);
        }
        log
    }

    /// Recorded numbers in insertion order.
    pub fn numbers(&self) -> Vec<u32> {
        self.lock().entries.iter().map(|entry| entry.number).collect()
    }

    pub fn is_created(&self) -> bool {
        self.lock().created
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // Entries stay valid after a panicking holder.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ExecutionLog for MemoryExecutionLog {
    async fn ensure_created(&mut self) -> Result<(), MigrationError> {
        self.lock().created = true;
        Ok(())
    }

    async fn entries(&mut self) -> Result<Vec<ExecutedMigration>, MigrationError> {
        Ok(self.lock().entries.clone())
    }

    async fn append(&mut self, entry: ExecutedMigration) -> Result<(), MigrationError> {
        let mut state = self.lock();
        state.created = true;
        state.entries.push(entry);
        Ok(())
    }
}
