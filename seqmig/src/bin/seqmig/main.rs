mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand};

use commands::init::{self, InitArgs, handle_init};
use commands::status::{self, StatusArgs, handle_status};
use output::{GlobalOptions, OutputFormat, OutputManager};

const ENVIRONMENT_HELP: &str = "\
Environment Variables:
  REDIS_URL        Redis connection URL for the execution log
  SEQMIG_DISABLED  Set to 1/true to disable migration runs
  RUST_LOG         Log level for diagnostic output (e.g. seqmig=debug)
";

fn help_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().bold())
        .usage(AnsiColor::BrightBlue.on_default().bold())
        .literal(AnsiColor::Magenta.on_default())
        .placeholder(AnsiColor::BrightBlack.on_default())
        .error(AnsiColor::Red.on_default().bold())
}

/// Inspect and prepare the seqmig execution log.
///
/// Migrations are compiled into your application and applied by its
/// pre-synchronization hook. This tool writes the project configuration and
/// reads the execution log that records which migrations have run.
#[derive(Parser)]
#[command(name = "seqmig", version, styles = help_styles(), after_long_help = ENVIRONMENT_HELP)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize seqmig in the current project
    #[command(after_long_help = init::EXAMPLES)]
    Init(InitArgs),

    /// Show applied migrations recorded in the execution log
    #[command(after_long_help = status::EXAMPLES)]
    Status(StatusArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = execute(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    match cli.command {
        Commands::Init(args) => handle_init(args, &output).await,
        Commands::Status(args) => handle_status(args, &output).await,
    }
}
