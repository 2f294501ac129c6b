//! Validate configuration command.

use anyhow::{Context, Result};
use arena_agents::AgentRegistry;
use arena_config::AppConfig;
use std::path::Path;

use crate::cli::ValidateArgs;

pub fn run(
    args: ValidateArgs,
    config_path: &Path,
    config: Result<AppConfig, config::ConfigError>,
) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    config.validate().context("Invalid configuration")?;

    // Build every agent once so bad kinds and params surface here
    let registry = AgentRegistry::new();
    for entry in &config.agents {
        registry
            .create(&entry.kind, entry.name(), entry.params.clone())
            .with_context(|| format!("Invalid agent '{}'", entry.name()))?;
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Log level: {}", config.logging.level);
    println!("Source: {:?}", config.data.source);
    println!("Symbols: {}", config.data.symbols.join(", "));
    println!("Initial cash: ${}", config.simulation.initial_cash);
    println!(
        "Fee per trade: ${} ({})",
        config.simulation.fee_per_trade,
        if config.simulation.fees_enabled { "enabled" } else { "disabled" }
    );
    println!("Agents: {}", config.agents.len());
    for entry in &config.agents {
        println!("  - {} ({})", entry.name(), entry.kind);
    }

    if args.show {
        println!();
        println!("{}", config.to_toml()?);
    }

    Ok(())
}
