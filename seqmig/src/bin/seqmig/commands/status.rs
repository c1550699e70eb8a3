use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use seqmig::{ExecutedMigration, ExecutionLog, RedisExecutionLog};
use serde::Serialize;

use crate::context::ProjectContext;
use crate::output::{GlobalOptions, OutputManager, TableDisplay};

pub const EXAMPLES: &str = "\
Examples:
  seqmig status                  # Show applied migrations
  seqmig status --output json    # Machine-readable log
  seqmig status --store app:log  # Read a different log store
";

#[derive(Args)]
pub struct StatusArgs {
    /// Execution log store to read (defaults to the configured store name)
    #[arg(long)]
    pub store: Option<String>,
}

/// Execution log summary shown by `seqmig status`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub store_name: String,
    pub disabled: bool,
    pub last_applied: Option<u32>,
    pub entries: Vec<ExecutedMigration>,
}

impl StatusReport {
    pub fn new(store_name: String, disabled: bool, entries: Vec<ExecutedMigration>) -> Self {
        let last_applied = entries.iter().map(|entry| entry.number).max();
        Self {
            store_name,
            disabled,
            last_applied,
            entries,
        }
    }
}

impl TableDisplay for StatusReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = options.table();
        table.set_header(vec!["#", "Name", "Applied at", "Duration"]);
        if self.entries.is_empty() {
            table.add_row(vec![Cell::new("-"), Cell::new("No migrations applied")]);
            return table;
        }

        for entry in &self.entries {
            table.add_row(vec![
                Cell::new(entry.number),
                Cell::new(&entry.name),
                Cell::new(entry.applied_at.format("%Y-%m-%d %H:%M:%S UTC")),
                Cell::new(format!("{}ms", entry.execution_time_ms)),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        match self.last_applied {
            Some(number) => format!("{}: {} applied, last={number}", self.store_name, self.entries.len()),
            None => format!("{}: none applied", self.store_name),
        }
    }
}

pub async fn handle_status(args: StatusArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;

    if !ctx.is_initialized() {
        output.warning("seqmig is not initialized in this project; using default settings.");
        output.info("Run 'seqmig init' to write a config file.");
    }

    let store_name = args
        .store
        .unwrap_or_else(|| ctx.config.migrations.store_name.clone());

    let redis_url = ctx
        .config
        .redis_url()
        .context("REDIS_URL environment variable not set. Set it to connect to Redis.")?;

    output.progress("Connecting to Redis...");
    let mut log = RedisExecutionLog::connect(&redis_url, store_name.clone())
        .await
        .context("Failed to connect to Redis")?;
    let entries = log
        .entries()
        .await
        .context("Failed to read the execution log")?;
    output.clear_line();

    let report = StatusReport::new(store_name, ctx.config.migrations.disabled, entries);

    output.heading("Execution Log");
    if output.options.verbose {
        output.key_value("Project", &ctx.project_root.display().to_string());
    }
    output.key_value("Store", &report.store_name);
    output.key_value(
        "Last applied",
        &report
            .last_applied
            .map_or_else(|| "none".to_string(), |n| n.to_string()),
    );
    if report.disabled {
        output.warning("Migrations are disabled through configuration");
    }

    output.display(&report)
}
