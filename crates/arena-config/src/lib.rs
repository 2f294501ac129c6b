//! Configuration management.

mod settings;

pub use settings::{
    AgentSettings, AppConfig, AppSettings, DataSettings, LoggingConfig, SettingsError, SourceKind,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Environment variable prefix; `ARENA__SIMULATION__INITIAL_CASH=1000`
/// overrides `simulation.initial_cash`.
pub const ENV_PREFIX: &str = "ARENA";

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Parse configuration from TOML text, without environment overrides.
pub fn parse_config(toml_text: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml_text, config::FileFormat::Toml))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_agents::AgentRegistry;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SAMPLE: &str = r#"
[app]
name = "test-arena"

[simulation]
initial_cash = 1000
fee_per_trade = 0.5
max_steps = 50

[data]
source = "synthetic"
symbols = ["AAA", "BBB"]

[data.synthetic]
steps = 100
volatility = 0.01

[[agents]]
kind = "momentum"
name = "fast_momentum"
params = { lookback = 3, threshold = 0.02 }

[[agents]]
kind = "random"
"#;

    #[test]
    fn test_parse_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.app.name, "test-arena");
        assert_eq!(config.simulation.initial_cash, dec!(1000));
        assert_eq!(config.simulation.fee_per_trade, dec!(0.5));
        assert_eq!(config.simulation.max_steps, Some(50));
        assert!(config.simulation.fees_enabled);
        assert_eq!(config.data.source, SourceKind::Synthetic);
        assert_eq!(config.data.synthetic.steps, 100);
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[0].params["lookback"], 3);
        assert_eq!(config.agents[1].name(), "random");
        config.validate().unwrap();
    }

    #[test]
    fn test_load_config_file() {
        let path = std::env::temp_dir().join(format!("arena-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.data.symbols, vec!["AAA", "BBB"]);

        std::fs::remove_file(&path).unwrap();
    }

    fn build_all(agents: &[AgentSettings]) -> Vec<String> {
        let registry = AgentRegistry::new();
        agents
            .iter()
            .filter_map(|a| {
                registry
                    .create(&a.kind, a.name(), a.params.clone())
                    .err()
                    .map(|e| format!("{}: {}", a.name(), e))
            })
            .collect()
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let config = load_config(&path).unwrap();
        config.validate().unwrap();
        assert_eq!(config.agents.len(), 10);
        assert_eq!(config.agents[6].name(), "careful_trend");

        let failures = build_all(&config.agents);
        assert!(failures.is_empty(), "agents that cannot be built: {failures:?}");
    }

    #[test]
    fn test_default_agents_can_be_built() {
        let failures = build_all(&AppConfig::default().agents);
        assert!(failures.is_empty(), "agents that cannot be built: {failures:?}");
    }

    #[test]
    fn test_bad_agent_params_pass_validate_but_fail_to_build() {
        let config = parse_config(
            r#"
[[agents]]
kind = "ma_crossover"
params = { fast = 5, slow = 20 }
"#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(build_all(&config.agents).len(), 1);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_config(Path::new("/definitely/not/here.toml")).is_err());
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let text = AppConfig::default().to_toml().unwrap();
        let parsed = parse_config(&text).unwrap();
        assert_eq!(parsed.simulation, AppConfig::default().simulation);
        assert_eq!(parsed.agents.len(), AppConfig::default().agents.len());
        parsed.validate().unwrap();
    }
}
