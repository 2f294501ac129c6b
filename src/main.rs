//! Strategy arena CLI application.

mod cli;

use anyhow::Result;
use arena_config::load_config;
use arena_monitor::setup_logging;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging settings come from the config file unless overridden on the command line
    let config = load_config(&cli.config);
    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| logging.level.clone());
    let _guard = setup_logging(
        &level,
        cli.json_logs || logging.is_json(),
        logging.file.as_deref().map(Path::new),
    );

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &cli.config, config).await,
        Commands::Agents => cli::commands::agents::run(),
        Commands::ValidateConfig(args) => cli::commands::validate::run(args, &cli.config, config),
    }
}
