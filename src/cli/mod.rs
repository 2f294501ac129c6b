//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arena")]
#[command(author, version, about = "Replay prices through competing trading agents")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "ARENA_CONFIG")]
    pub config: PathBuf,

    /// Log level (overrides the config file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run all configured agents against a price source
    Run(RunArgs),
    /// List available agent kinds and their default parameters
    Agents,
    /// Validate configuration
    ValidateConfig(ValidateArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Replay this CSV file instead of the configured source
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Symbols to trade (comma-separated)
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Stop after this many steps
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// Seed for the synthetic source
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable per-trade fees
    #[arg(long)]
    pub no_fees: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,

    /// Directory for the report, curves and trade log
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Do not write any files
    #[arg(long)]
    pub no_save: bool,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub show: bool,
}
