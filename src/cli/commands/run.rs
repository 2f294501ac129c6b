//! Run command implementation.

use anyhow::{bail, Context, Result};
use arena_agents::AgentRegistry;
use arena_config::{AppConfig, SourceKind};
use arena_core::traits::PriceSource;
use arena_data::{CsvPriceSource, SyntheticSource};
use arena_sim::{RunReport, Simulation};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cli::RunArgs;

pub async fn run(
    args: RunArgs,
    config_path: &Path,
    config: Result<AppConfig, config::ConfigError>,
) -> Result<()> {
    let mut config = config
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    let mut source = build_source(&config)?;
    let symbols = if config.data.symbols.is_empty() {
        source.symbols()
    } else {
        config.data.symbols.clone()
    };
    if symbols.is_empty() {
        bail!("No symbols to trade; set data.symbols or use a source that lists its symbols");
    }

    let mut sim = Simulation::new(config.simulation.clone(), symbols)?;
    let registry = AgentRegistry::new();
    for entry in &config.agents {
        let agent = registry
            .create(&entry.kind, entry.name(), entry.params.clone())
            .with_context(|| format!("Failed to create agent '{}'", entry.name()))?;
        sim.add_agent(agent)?;
    }

    info!(
        app = %config.app.name,
        source = source.name(),
        agents = sim.agents().len(),
        "Starting arena run"
    );

    let stop = sim.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current step");
            stop.stop();
        }
    });

    let report = sim.run(source.as_mut()).await?;

    match args.output.as_str() {
        "json" => println!("{}", report.to_json()?),
        _ => println!("{}", report.summary()),
    }

    if !args.no_save {
        let dir = args.out_dir.clone().unwrap_or_else(|| {
            PathBuf::from(&config.app.output_dir).join(report.run_id.to_string())
        });
        save_report(&report, &dir)?;
        info!("Results saved to {:?}", dir);
    }

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: &RunArgs) {
    if let Some(path) = &args.data {
        config.data.source = SourceKind::Csv;
        config.data.path = Some(path.display().to_string());
    }
    if !args.symbols.is_empty() {
        config.data.symbols = args.symbols.clone();
    }
    if let Some(max_steps) = args.max_steps {
        config.simulation.max_steps = Some(max_steps);
    }
    if let Some(seed) = args.seed {
        config.data.synthetic.seed = Some(seed);
    }
    if args.no_fees {
        config.simulation.fees_enabled = false;
        config.simulation.fee_per_trade = Decimal::ZERO;
    }
}

fn build_source(config: &AppConfig) -> Result<Box<dyn PriceSource>> {
    match config.data.source {
        SourceKind::Csv => {
            let path = config
                .data
                .path
                .as_deref()
                .context("data.path is required for the csv source")?;
            let source = CsvPriceSource::new(path)
                .with_context(|| format!("Failed to load price data from {}", path))?;
            if source.skipped_rows() > 0 {
                warn!(skipped = source.skipped_rows(), "Some CSV rows could not be parsed");
            }
            info!(path, snapshots = source.len(), "Loaded CSV prices");
            Ok(Box::new(source))
        }
        SourceKind::Synthetic => {
            let source = SyntheticSource::new(config.data.synthetic.clone())?;
            Ok(Box::new(source))
        }
    }
}

fn save_report(report: &RunReport, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    std::fs::write(dir.join("report.json"), report.to_json()?)?;
    std::fs::write(dir.join("curves.csv"), report.curves_to_csv()?)?;
    std::fs::write(dir.join("trades.log"), report.trades_log())?;
    Ok(())
}
