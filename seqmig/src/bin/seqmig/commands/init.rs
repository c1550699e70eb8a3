use anyhow::{Context, Result};
use clap::Args;
use seqmig::{ExecutionLog, RedisExecutionLog};

use crate::context::ProjectContext;
use crate::output::OutputManager;

pub const EXAMPLES: &str = "\
Examples:
  seqmig init                    # Write .seqmig/config.toml with defaults
  seqmig init --create-store     # Also create the execution log in Redis
";

#[derive(Args)]
pub struct InitArgs {
    /// Create the execution log store in Redis after writing the config
    #[arg(long)]
    pub create_store: bool,
}

pub async fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;

    output.heading("Initialize seqmig");

    if ctx.is_initialized() {
        output.info(&format!(
            "Config already exists at {}",
            ctx.config_path.display()
        ));
    } else {
        std::fs::create_dir_all(&ctx.seqmig_dir)
            .with_context(|| format!("Failed to create {}", ctx.seqmig_dir.display()))?;
        let content = ctx.config.to_toml_string()?;
        std::fs::write(&ctx.config_path, content)
            .with_context(|| format!("Failed to write {}", ctx.config_path.display()))?;
        output.success(&format!("Created {}", ctx.config_path.display()));
    }

    if args.create_store {
        let redis_url = ctx
            .config
            .redis_url()
            .context("REDIS_URL environment variable not set. Set it to connect to Redis.")?;

        output.progress("Connecting to Redis...");
        let mut log = RedisExecutionLog::connect(&redis_url, ctx.config.migrations.store_name.clone())
            .await
            .context("Failed to connect to Redis")?;
        output.clear_line();

        log.ensure_created()
            .await
            .context("Failed to create the execution log store")?;
        output.success(&format!(
            "Execution log store '{}' is ready",
            log.store_name()
        ));
    }

    Ok(())
}
