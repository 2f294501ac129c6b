//! Volatility breakout agent.
//!
//! Builds a band of `mean ± std_mult * σ` over the recent window and trades
//! closes outside it.

use arena_core::{
    error::AgentError,
    traits::{Agent, AgentConfig, DecisionContext},
    types::Decision,
};
use arena_indicators::statistics::mean_std;
use serde::{Deserialize, Serialize};

/// Configuration for the volatility breakout agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolatilityBreakoutConfig {
    /// Window length (including the current price)
    pub period: usize,
    /// Band width in standard deviations
    pub std_mult: f64,
    /// Shares per entry
    pub quantity: u64,
}

impl Default for VolatilityBreakoutConfig {
    fn default() -> Self {
        Self {
            period: 20,
            std_mult: 2.0,
            quantity: 1,
        }
    }
}

impl AgentConfig for VolatilityBreakoutConfig {
    fn validate(&self) -> Result<(), AgentError> {
        if self.period < 2 {
            return Err(AgentError::InvalidConfig(
                "Period must be at least 2".into(),
            ));
        }
        if !self.std_mult.is_finite() || self.std_mult <= 0.0 {
            return Err(AgentError::InvalidConfig(
                "Standard deviation multiplier must be positive".into(),
            ));
        }
        if self.quantity == 0 {
            return Err(AgentError::InvalidConfig(
                "Quantity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Volatility breakout agent.
pub struct VolatilityBreakoutAgent {
    name: String,
    config: VolatilityBreakoutConfig,
}

impl VolatilityBreakoutAgent {
    /// Create a new volatility breakout agent.
    pub fn new(name: impl Into<String>, config: VolatilityBreakoutConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Lower and upper band for a history, if it is long enough.
    pub fn bands(&self, history: &[f64]) -> Option<(f64, f64)> {
        let (mean, std) = mean_std(history, self.config.period)?;
        let width = self.config.std_mult * std;
        Some((mean - width, mean + width))
    }
}

impl Agent for VolatilityBreakoutAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "volatility_breakout"
    }

    fn description(&self) -> &str {
        "Buys closes above the upper volatility band, exits below the lower band"
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
        let price = crate::current_price(ctx)?;
        let Some((lower, upper)) = self.bands(ctx.history) else {
            return Ok(Decision::hold());
        };
        let held = ctx.held();

        if price > upper && held == 0 && ctx.can_afford(self.config.quantity) {
            Ok(Decision::buy(self.config.quantity))
        } else if price < lower && held > 0 {
            Ok(Decision::sell(held))
        } else {
            Ok(Decision::hold())
        }
    }

    fn warmup_period(&self) -> usize {
        self.config.period
    }
}
