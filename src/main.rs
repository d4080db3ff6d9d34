//! Trading engine CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use robotrade_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level {
        cli::LogLevel::Trace => "trace",
        cli::LogLevel::Debug => "debug",
        cli::LogLevel::Info => "info",
        cli::LogLevel::Warn => "warn",
        cli::LogLevel::Error => "error",
    };
    let _guard = setup_logging(log_level, cli.json_logs, cli.log_dir.as_deref());

    // Execute command
    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &cli.config).await,
        Commands::Paper(args) => cli::commands::paper::run(args, &cli.config).await,
        Commands::Positions => cli::commands::positions::run(&cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
