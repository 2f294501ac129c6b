//! Agent registry for building agents from configuration.

use crate::{
    BreakoutAgent, BreakoutConfig, CompositeAgent, CompositeConfig, MaCrossoverAgent,
    MaCrossoverConfig, MomentumAgent, MomentumConfig, RandomAgent, RandomConfig,
    RsiReversionAgent, RsiReversionConfig, TrendAgent, TrendConfig, VolatilityBreakoutAgent,
    VolatilityBreakoutConfig,
};
use arena_core::{
    error::AgentError,
    traits::{Agent, AgentConfig},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Information about a registered agent kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    /// Registry key
    pub kind: String,
    /// Display name
    pub name: String,
    /// Agent description
    pub description: String,
    /// Default parameters as JSON
    pub default_config: serde_json::Value,
}

impl AgentInfo {
    fn entry<C: Serialize + Default>(kind: &str, name: &str, description: &str) -> (String, Self) {
        let info = Self {
            kind: kind.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            default_config: serde_json::to_value(C::default()).unwrap_or_default(),
        };
        (kind.to_string(), info)
    }
}

/// Registry of the built-in agent kinds.
pub struct AgentRegistry {
    agents: BTreeMap<String, AgentInfo>,
}

impl AgentRegistry {
    /// Create a new registry with all built-in agents.
    pub fn new() -> Self {
        let agents = [
            AgentInfo::entry::<MomentumConfig>(
                "momentum",
                "Momentum",
                "Buys on positive rate of change, sells on negative",
            ),
            AgentInfo::entry::<RsiReversionConfig>(
                "rsi_reversion",
                "RSI Mean Reversion",
                "Buys RSI oversold dips, sells the position when overbought",
            ),
            AgentInfo::entry::<BreakoutConfig>(
                "breakout",
                "Breakout",
                "Trades breaks above or below the recent high/low channel",
            ),
            AgentInfo::entry::<MaCrossoverConfig>(
                "ma_crossover",
                "MA Crossover",
                "Trades fast/slow moving average crossovers",
            ),
            AgentInfo::entry::<VolatilityBreakoutConfig>(
                "volatility_breakout",
                "Volatility Breakout",
                "Buys closes above the upper volatility band, exits below the lower band",
            ),
            AgentInfo::entry::<TrendConfig>(
                "trend",
                "Trend",
                "Buys after consecutive rises, exits after consecutive falls",
            ),
            AgentInfo::entry::<CompositeConfig>(
                "composite",
                "Composite",
                "Votes across ROC, RSI, z-score and EMA trend",
            ),
            AgentInfo::entry::<RandomConfig>(
                "random",
                "Random",
                "Uniformly random buy/sell/hold baseline",
            ),
        ]
        .into_iter()
        .collect();

        Self { agents }
    }

    /// List all available agent kinds, sorted by key.
    pub fn list(&self) -> Vec<&AgentInfo> {
        self.agents.values().collect()
    }

    /// Get agent info by kind.
    pub fn get(&self, kind: &str) -> Option<&AgentInfo> {
        self.agents.get(kind)
    }

    /// Check if an agent kind exists.
    pub fn exists(&self, kind: &str) -> bool {
        self.agents.contains_key(kind)
    }

    /// Get all agent kinds.
    pub fn kinds(&self) -> Vec<&String> {
        self.agents.keys().collect()
    }

    /// Create an agent instance from a kind, a unique name and JSON params.
    ///
    /// Missing params fall back to the kind's defaults; `null` means all
    /// defaults.
    pub fn create(
        &self,
        kind: &str,
        name: &str,
        params: serde_json::Value,
    ) -> Result<Box<dyn Agent>, AgentError> {
        let params = if params.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            params
        };

        let agent = match kind {
            "momentum" => build(params, |c: MomentumConfig| MomentumAgent::new(name, c))?,
            "rsi_reversion" => {
                build(params, |c: RsiReversionConfig| RsiReversionAgent::new(name, c))?
            }
            "breakout" => build(params, |c: BreakoutConfig| BreakoutAgent::new(name, c))?,
            "ma_crossover" => build(params, |c: MaCrossoverConfig| MaCrossoverAgent::new(name, c))?,
            "volatility_breakout" => build(params, |c: VolatilityBreakoutConfig| {
                VolatilityBreakoutAgent::new(name, c)
            })?,
            "trend" => build(params, |c: TrendConfig| TrendAgent::new(name, c))?,
            "composite" => build(params, |c: CompositeConfig| CompositeAgent::new(name, c))?,
            "random" => build(params, |c: RandomConfig| RandomAgent::new(name, c))?,
            _ => return Err(AgentError::NotFound(kind.to_string())),
        };

        debug!(kind, name, "Created agent");
        Ok(agent)
    }

    /// Create an agent with default parameters.
    pub fn create_default(&self, kind: &str, name: &str) -> Result<Box<dyn Agent>, AgentError> {
        let info = self
            .get(kind)
            .ok_or_else(|| AgentError::NotFound(kind.to_string()))?;
        self.create(kind, name, info.default_config.clone())
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn build<C, A>(
    params: serde_json::Value,
    make: impl FnOnce(C) -> A,
) -> Result<Box<dyn Agent>, AgentError>
where
    C: AgentConfig + DeserializeOwned,
    A: Agent + 'static,
{
    let config: C =
        serde_json::from_value(params).map_err(|e| AgentError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(Box::new(make(config)))
}
