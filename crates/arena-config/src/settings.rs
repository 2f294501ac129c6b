//! Configuration structures.

use arena_data::SyntheticConfig;
use arena_sim::SimulationConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Semantic problems in an otherwise well-formed configuration.
#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate agent name: {0}")]
    DuplicateAgent(String),

    #[error("No agents configured")]
    NoAgents,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SettingsError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SettingsError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            logging: LoggingConfig::default(),
            simulation: SimulationConfig::default(),
            data: DataSettings::default(),
            agents: default_agents(),
        }
    }
}

fn default_agents() -> Vec<AgentSettings> {
    vec![
        AgentSettings::new("momentum", json!({ "lookback": 5, "threshold": 0.01 })),
        AgentSettings::new("rsi_reversion", Value::Null),
        AgentSettings::new("trend", Value::Null),
        AgentSettings::new("random", json!({ "seed": 42 })),
    ]
}

impl AppConfig {
    /// Check cross-field constraints the deserializer cannot express.
    ///
    /// Agent kinds and params are checked by the agent registry when the
    /// agents are built.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.logging.validate()?;

        let sim = &self.simulation;
        if sim.initial_cash <= Decimal::ZERO {
            return Err(SettingsError::invalid("simulation.initial_cash", "must be positive"));
        }
        if sim.fee_per_trade < Decimal::ZERO {
            return Err(SettingsError::invalid("simulation.fee_per_trade", "must not be negative"));
        }
        if sim.max_steps == Some(0) {
            return Err(SettingsError::invalid("simulation.max_steps", "must be at least 1"));
        }

        self.data.validate()?;

        if self.agents.is_empty() {
            return Err(SettingsError::NoAgents);
        }
        let mut names = HashSet::new();
        for agent in &self.agents {
            if agent.kind.trim().is_empty() {
                return Err(SettingsError::invalid("agents.kind", "must not be empty"));
            }
            if !names.insert(agent.name()) {
                return Err(SettingsError::DuplicateAgent(agent.name().to_string()));
            }
        }

        Ok(())
    }

    /// Render as TOML, e.g. to bootstrap a config file.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Serialization(e.to_string()))
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    /// Directory run outputs are written to
    pub output_dir: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "strategy-arena".to_string(),
            output_dir: "runs".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Also append logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    fn validate(&self) -> Result<(), SettingsError> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(SettingsError::invalid(
                "logging.level",
                format!("'{}' is not one of {}", self.level, LEVELS.join(", ")),
            ));
        }
        if !self.is_json() && !self.format.eq_ignore_ascii_case("pretty") {
            return Err(SettingsError::invalid(
                "logging.format",
                format!("'{}' is not pretty or json", self.format),
            ));
        }
        Ok(())
    }
}

/// Where prices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Replay a CSV file
    Csv,
    /// Seeded random walk
    #[default]
    Synthetic,
}

/// Price data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub source: SourceKind,
    /// CSV file for the `csv` source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Symbols to trade; for CSV, empty means every symbol in the file
    pub symbols: Vec<String>,
    /// Random-walk parameters for the `synthetic` source
    pub synthetic: SyntheticConfig,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            source: SourceKind::Synthetic,
            path: None,
            symbols: vec!["AAA".to_string(), "BBB".to_string()],
            synthetic: SyntheticConfig {
                seed: Some(7),
                ..SyntheticConfig::default()
            },
        }
    }
}

impl DataSettings {
    fn validate(&self) -> Result<(), SettingsError> {
        match self.source {
            SourceKind::Csv => {
                if self.path.as_deref().map_or(true, |p| p.trim().is_empty()) {
                    return Err(SettingsError::invalid("data.path", "required for the csv source"));
                }
            }
            SourceKind::Synthetic => {
                if self.symbols.is_empty() {
                    return Err(SettingsError::invalid(
                        "data.symbols",
                        "required for the synthetic source",
                    ));
                }
                self.synthetic
                    .validate()
                    .map_err(|e| SettingsError::invalid("data.synthetic", e.to_string()))?;
            }
        }

        if self.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(SettingsError::invalid("data.symbols", "contains an empty symbol"));
        }
        Ok(())
    }
}

/// One agent entry: `{kind, name, params}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Registry key (e.g. `momentum`)
    pub kind: String,
    /// Unique name; defaults to the kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variant-specific config; missing fields take their defaults
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl AgentSettings {
    pub fn new(kind: impl Into<String>, params: Value) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            params,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.kind)
    }
}
