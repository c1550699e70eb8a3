//! seqmig core library.
//!
//! Numbered, run-once migrations: discover the registered `MigrationN` types,
//! validate the batch as a whole, compare it with the persisted execution
//! log, and apply what is pending in ascending order, recording each success
//! before the next migration starts.
//!
//! # Example
//! ```ignore
//! use seqmig::{Migration, MigrationContext, MigrationRunner, RegisteredMigrations};
//!
//! #[derive(Default, Migration)]
//! pub struct Migration1;
//!
//! #[seqmig::async_trait]
//! impl Migration for Migration1 {
//!     async fn execute(&self, ctx: &mut MigrationContext<'_>) -> anyhow::Result<()> {
//!         ctx.collection("articles").field("teaser").rename("summary").await?;
//!         Ok(())
//!     }
//! }
//!
//! let mut runner = MigrationRunner::new(log, repository);
//! runner.run(&RegisteredMigrations).await?;
//! ```

extern crate self as seqmig;

pub mod config;
pub mod content;
pub mod discovery;
pub mod errors;
pub mod history;
pub mod hook;
pub mod keys;
pub mod migration;
pub mod runner;
pub mod validation;

pub use config::SeqmigConfig;
pub use content::{
    CollectionAction, ContentRepository, FieldAction, MemoryContentRepository, MigrationContext,
    RedisContentRepository,
};
pub use discovery::{MigrationProvider, RegisteredMigrations, StaticMigrations, registered_migrations};
pub use errors::*;
pub use history::{ExecutedMigration, ExecutionLog, MemoryExecutionLog, RedisExecutionLog};
pub use hook::{MigrationsHook, PreSynchronizationHook, SynchronizationContext};
pub use migration::{Migration, MigrationDescriptor, MigrationFactory, migration_number};
pub use runner::{MigrationPlan, MigrationRunner, MigrationStats, RunOutcome};
pub use seqmig_macros::Migration;
pub use validation::{ValidatedMigration, validate_batch};

// Re-exported so migration crates and the derive macro need no direct dependency
pub use async_trait::async_trait;
pub use inventory;
pub use redis;
