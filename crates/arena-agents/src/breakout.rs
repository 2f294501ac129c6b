//! Channel breakout agent.
//!
//! Compares the current price with the high/low channel of the preceding
//! prices and trades in the direction of a break.

use arena_core::{
    error::AgentError,
    traits::{Agent, AgentConfig, DecisionContext},
    types::Decision,
};
use arena_indicators::{rolling_high, rolling_low};
use serde::{Deserialize, Serialize};

/// Configuration for the breakout agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakoutConfig {
    /// Window length including the current price
    pub lookback: usize,
    /// Shares per trade
    pub quantity: u64,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            quantity: 1,
        }
    }
}

impl AgentConfig for BreakoutConfig {
    fn validate(&self) -> Result<(), AgentError> {
        if self.lookback < 2 {
            return Err(AgentError::InvalidConfig(
                "Lookback must be at least 2".into(),
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

/// Channel breakout agent.
pub struct BreakoutAgent {
    name: String,
    config: BreakoutConfig,
}

impl BreakoutAgent {
    /// Create a new breakout agent.
    pub fn new(name: impl Into<String>, config: BreakoutConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

impl Agent for BreakoutAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "breakout"
    }

    fn description(&self) -> &str {
        "Trades breaks above or below the recent high/low channel"
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
        let price = crate::current_price(ctx)?;
        if ctx.history.len() < self.config.lookback {
            return Ok(Decision::hold());
        }

        // Channel excludes the current price.
        let previous = &ctx.history[..ctx.history.len() - 1];
        let window = self.config.lookback - 1;
        let (Some(high), Some(low)) =
            (rolling_high(previous, window), rolling_low(previous, window))
        else {
            return Ok(Decision::hold());
        };

        if price > high {
            Ok(Decision::buy(self.config.quantity))
        } else if price < low {
            Ok(Decision::sell(self.config.quantity))
        } else {
            Ok(Decision::hold())
        }
    }

    fn warmup_period(&self) -> usize {
        self.config.lookback
    }
}
