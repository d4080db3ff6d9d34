//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "robotrade")]
#[command(author, version, about = "Cycle-driven automated trading engine")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Also write logs to daily files in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trade live prices until interrupted
    Run(RunArgs),
    /// Trade recorded or synthesized prices for a fixed number of cycles
    Paper(PaperArgs),
    /// List configured positions
    Positions,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Price feed WebSocket URL (overrides configuration)
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Cycle deadline in milliseconds (overrides configuration)
    #[arg(long)]
    pub cycle_timeout_ms: Option<u64>,
}

#[derive(clap::Args)]
pub struct PaperArgs {
    /// Tick data file (CSV with ticker,buy_price,sell_price columns)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Number of cycles to run
    #[arg(long, default_value = "3")]
    pub cycles: u64,

    /// Pause between replayed ticks in milliseconds
    #[arg(long)]
    pub tick_interval_ms: Option<u64>,
}
