//! Migration runner: validate the registered batch, then apply pending
//! migrations in ascending order, recording each one as it succeeds.

use std::time::Instant;

use crate::content::{ContentRepository, MigrationContext};
use crate::discovery::MigrationProvider;
use crate::errors::MigrationError;
use crate::history::{ExecutedMigration, ExecutionLog};
use crate::validation::{ValidatedMigration, validate_batch};

/// Statistics from a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStats {
    /// Highest number recorded before the run (0 when nothing had run)
    pub baseline: u32,
    /// Numbers applied during this run, in order
    pub applied: Vec<u32>,
    /// Migrations skipped because they were already applied
    pub migrations_skipped: u32,
    /// Numbers that would have run (dry run only)
    pub pending: Vec<u32>,
    /// Total execution time in milliseconds
    pub total_time_ms: u64,
}

impl MigrationStats {
    pub fn migrations_applied(&self) -> usize {
        self.applied.len()
    }
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Migrations are disabled; nothing was discovered, validated, or executed.
    Disabled,
    Completed(MigrationStats),
}

/// Validated batch split around the baseline.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    /// Highest number in the execution log, 0 when empty
    pub baseline: u32,
    /// Registered migrations at or below the baseline
    pub already_applied: usize,
    /// Migrations above the baseline, ascending
    pub pending: Vec<ValidatedMigration>,
}

impl MigrationPlan {
    pub fn pending_numbers(&self) -> Vec<u32> {
        self.pending.iter().map(|m| m.number).collect()
    }
}

/// Migration runner.
///
/// Runs are sequential. Nothing here guards against two processes running
/// against the same execution log at once; deployments must serialize runs.
pub struct MigrationRunner<L, R> {
    log: L,
    repository: R,
    disabled: bool,
    dry_run: bool,
}

impl<L, R> MigrationRunner<L, R>
where
    L: ExecutionLog,
    R: ContentRepository,
{
    pub fn new(log: L, repository: R) -> Self {
        Self {
            log,
            repository,
            disabled: false,
            dry_run: false,
        }
    }

    /// Turn every run into a no-op.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Validate and report pending migrations without executing them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the batch and work out what a run would execute.
    pub async fn plan(&mut self, provider: &dyn MigrationProvider) -> Result<MigrationPlan, MigrationError> {
        self.log.ensure_created().await?;

        let migrations = provider.migrations();
        log::debug!("discovered {} migration(s)", migrations.len());

        let executed: Vec<u32> = self.log.entries().await?.iter().map(|entry| entry.number).collect();
        let validated = validate_batch(&migrations, &executed)?;

        let baseline = executed.iter().copied().max().unwrap_or(0);
        log::debug!("last migration executed according to the log was {baseline}");

        let (already_applied, pending): (Vec<_>, Vec<_>) =
            validated.into_iter().partition(|migration| migration.number <= baseline);
        Ok(MigrationPlan {
            baseline,
            already_applied: already_applied.len(),
            pending,
        })
    }

    /// Run all pending migrations.
    pub async fn run(&mut self, provider: &dyn MigrationProvider) -> Result<RunOutcome, MigrationError> {
        if self.disabled {
            log::debug!("migrations have been disabled through configuration; skipping");
            return Ok(RunOutcome::Disabled);
        }

        let start_time = Instant::now();
        let plan = self.plan(provider).await?;

        let mut stats = MigrationStats {
            baseline: plan.baseline,
            migrations_skipped: plan.already_applied as u32,
            ..MigrationStats::default()
        };

        if plan.pending.is_empty() {
            log::debug!("all migrations are up to date");
        } else if self.dry_run {
            stats.pending = plan.pending_numbers();
            log::info!("dry run: {} migration(s) pending: {:?}", stats.pending.len(), stats.pending);
        } else {
            for migration in &plan.pending {
                self.apply(migration).await?;
                stats.applied.push(migration.number);
            }
        }

        stats.total_time_ms = start_time.elapsed().as_millis() as u64;
        Ok(RunOutcome::Completed(stats))
    }

    async fn apply(&mut self, migration: &ValidatedMigration) -> Result<(), MigrationError> {
        let number = migration.number;
        let name = migration.descriptor.name;
        log::debug!("executing migration {number}");

        let unit = migration.descriptor.instantiate();
        let migration_start = Instant::now();
        {
            let mut ctx = MigrationContext::new(&mut self.repository, number, name);
            if let Err(source) = unit.execute(&mut ctx).await {
                log::error!("migration {number} ({name}) failed: {source:#}");
                return Err(MigrationError::ExecutionFailed {
                    number,
                    name: name.to_string(),
                    source,
                });
            }
        }
        let execution_time_ms = migration_start.elapsed().as_millis() as u64;

        self.log
            .append(ExecutedMigration::new(number, name, execution_time_ms))
            .await?;
        log::info!("applied migration {number} ({name}) in {execution_time_ms}ms");
        Ok(())
    }

    pub fn into_parts(self) -> (L, R) {
        (self.log, self.repository)
    }
}
