pub mod args;
pub mod commands;
pub mod report;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::CodeScopeConfig;
use crate::core::errors::CodeScopeError;

pub use args::{AnalyzeArgs, BlastArgs, Cli, Commands, OutputFormat};
use commands::analyze::AnalyzeCommand;
use commands::snapshot::{BlastCommand, HealthCommand, ValidateCommand};
use commands::Command;

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("codescope={log_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = CodeScopeConfig::discover(cli.config.as_deref())
        .await
        .map_err(CodeScopeError::from)?;

    match cli.command {
        Commands::Analyze(args) => AnalyzeCommand::new(args, config).execute().await,
        Commands::Blast(args) => BlastCommand::new(args, &config).execute().await,
        Commands::Validate { snapshot } => ValidateCommand::new(snapshot).execute().await,
        Commands::Health { snapshot } => HealthCommand::new(snapshot).execute().await,
    }
}
