//! Lifecycle hook that runs migrations ahead of a larger synchronization.

use async_trait::async_trait;

use crate::config::SeqmigConfig;
use crate::content::{ContentRepository, RedisContentRepository};
use crate::discovery::MigrationProvider;
use crate::errors::MigrationError;
use crate::history::{ExecutionLog, RedisExecutionLog};
use crate::runner::{MigrationRunner, RunOutcome};

/// What the synchronization process hands to its hooks.
pub struct SynchronizationContext<'a> {
    /// Where migrations are discovered.
    pub migrations: &'a dyn MigrationProvider,
}

impl<'a> SynchronizationContext<'a> {
    pub fn new(migrations: &'a dyn MigrationProvider) -> Self {
        Self { migrations }
    }
}

/// Called once before synchronization starts. An error halts synchronization.
#[async_trait]
pub trait PreSynchronizationHook: Send {
    async fn pre_synchronization(&mut self, ctx: &SynchronizationContext<'_>) -> Result<(), MigrationError>;
}

/// Applies pending migrations before synchronization.
pub struct MigrationsHook<L, R> {
    runner: MigrationRunner<L, R>,
    last_outcome: Option<RunOutcome>,
}

impl<L, R> MigrationsHook<L, R>
where
    L: ExecutionLog,
    R: ContentRepository,
{
    pub fn new(runner: MigrationRunner<L, R>) -> Self {
        Self {
            runner,
            last_outcome: None,
        }
    }

    /// Outcome of the most recent successful invocation.
    pub fn last_outcome(&self) -> Option<&RunOutcome> {
        self.last_outcome.as_ref()
    }
}

impl MigrationsHook<RedisExecutionLog, RedisContentRepository> {
    /// Build a Redis-backed hook from configuration.
    pub async fn connect(config: &SeqmigConfig) -> Result<Self, MigrationError> {
        let redis_url = config.redis_url()?;
        let log = RedisExecutionLog::connect(&redis_url, config.migrations.store_name.clone()).await?;
        let repository = RedisContentRepository::connect(&redis_url, config.redis.key_prefix.clone()).await?;
        let runner = MigrationRunner::new(log, repository).with_disabled(config.migrations.disabled);
        Ok(Self::new(runner))
    }
}

#[async_trait]
impl<L, R> PreSynchronizationHook for MigrationsHook<L, R>
where
    L: ExecutionLog,
    R: ContentRepository,
{
    async fn pre_synchronization(&mut self, ctx: &SynchronizationContext<'_>) -> Result<(), MigrationError> {
        log::debug!("migration hook executing");
        let outcome = self.runner.run(ctx.migrations).await?;
        self.last_outcome = Some(outcome);
        Ok(())
    }
}
