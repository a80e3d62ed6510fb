use clap::{Parser, Subcommand};
use sentinel_core::LogLevel;
use tracing_subscriber::EnvFilter;

mod commands;
mod integration;

use commands::check::{execute_check, execute_explain, CheckArgs};
use commands::validate::{execute_validate, ValidateArgs};

/// Sentinel Command Line Interface
///
/// Evaluates access decisions against permission records stored as JSON.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[clap(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether an identity may access a resource
    Check(CheckArgs),

    /// Show which rule decides access for an identity and resource
    Explain(CheckArgs),

    /// Load permission records and report problems
    Validate(ValidateArgs),
}

fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_directive()));

    // Logs go to stderr so that stdout only carries results.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Check(args) => execute_check(&args),
        Commands::Explain(args) => execute_explain(&args),
        Commands::Validate(args) => execute_validate(&args),
    }
}
