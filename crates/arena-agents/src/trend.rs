//! Consecutive-move trend agent.
//!
//! Buys after a run of strictly rising prices, sizing the order by how
//! strong the run was, and sells the whole position after a run of
//! strictly falling prices.

use arena_core::{
    error::AgentError,
    traits::{Agent, AgentConfig, DecisionContext},
    types::Decision,
};
use serde::{Deserialize, Serialize};

/// Configuration for the trend agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendConfig {
    /// Number of strictly increasing prices that trigger a buy
    pub buy_consecutive: usize,
    /// Number of strictly decreasing prices that trigger a sell
    pub sell_consecutive: usize,
    /// Buy size is `max(1, floor(run_gain / price * size_scale))`
    pub size_scale: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            buy_consecutive: 3,
            sell_consecutive: 2,
            size_scale: 100.0,
        }
    }
}

impl AgentConfig for TrendConfig {
    fn validate(&self) -> Result<(), AgentError> {
        if self.buy_consecutive < 2 || self.sell_consecutive < 2 {
            return Err(AgentError::InvalidConfig(
                "Consecutive counts must be at least 2".into(),
            ));
        }
        if !self.size_scale.is_finite() || self.size_scale < 0.0 {
            return Err(AgentError::InvalidConfig(
                "Size scale must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

fn strictly_increasing(window: &[f64]) -> bool {
    window.windows(2).all(|w| w[0] < w[1])
}

fn strictly_decreasing(window: &[f64]) -> bool {
    window.windows(2).all(|w| w[0] > w[1])
}

/// Consecutive-move trend agent.
pub struct TrendAgent {
    name: String,
    config: TrendConfig,
}

impl TrendAgent {
    /// Create a new trend agent.
    pub fn new(name: impl Into<String>, config: TrendConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    fn buy_size(&self, run: &[f64]) -> u64 {
        let last = run[run.len() - 1];
        let increase = last - run[0];
        let scaled = (increase / last * self.config.size_scale).floor();
        if scaled.is_finite() && scaled >= 1.0 {
            scaled as u64
        } else {
            1
        }
    }
}

impl Agent for TrendAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "trend"
    }

    fn description(&self) -> &str {
        "Buys after consecutive rises, exits after consecutive falls"
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
        crate::current_price(ctx)?;
        let history = ctx.history;
        if history.len() < self.warmup_period() {
            return Ok(Decision::hold());
        }

        let buy_run = &history[history.len() - self.config.buy_consecutive..];
        if strictly_increasing(buy_run) {
            return Ok(Decision::buy(self.buy_size(buy_run)));
        }

        let sell_run = &history[history.len() - self.config.sell_consecutive..];
        if strictly_decreasing(sell_run) {
            let held = ctx.held();
            if held > 0 {
                return Ok(Decision::sell(held));
            }
        }

        Ok(Decision::hold())
    }

    fn warmup_period(&self) -> usize {
        self.config.buy_consecutive.max(self.config.sell_consecutive)
    }
}
