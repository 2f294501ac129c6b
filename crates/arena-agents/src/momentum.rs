//! Momentum agent.
//!
//! Buys when the rate of change over the lookback exceeds a threshold and
//! sells when it drops below the negative threshold.

use arena_core::{
    error::AgentError,
    traits::{Agent, AgentConfig, DecisionContext, Indicator},
    types::Decision,
};
use arena_indicators::Roc;
use serde::{Deserialize, Serialize};

/// Configuration for the momentum agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MomentumConfig {
    /// ROC lookback in steps
    pub lookback: usize,
    /// Minimum |ROC| to act on (0.01 = 1%)
    pub threshold: f64,
    /// Shares per trade
    pub quantity: u64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lookback: 5,
            threshold: 0.01,
            quantity: 1,
        }
    }
}

impl AgentConfig for MomentumConfig {
    fn validate(&self) -> Result<(), AgentError> {
        if self.lookback == 0 {
            return Err(AgentError::InvalidConfig(
                "Lookback must be greater than 0".into(),
            ));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(AgentError::InvalidConfig(
                "Threshold must be a non-negative number".into(),
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

/// Rate-of-change momentum agent.
pub struct MomentumAgent {
    name: String,
    config: MomentumConfig,
    roc: Roc,
    signals_generated: usize,
}

impl MomentumAgent {
    /// Create a new momentum agent.
    pub fn new(name: impl Into<String>, config: MomentumConfig) -> Self {
        let roc = Roc::new(config.lookback);
        Self {
            name: name.into(),
            config,
            roc,
            signals_generated: 0,
        }
    }

    /// Number of BUY/SELL decisions emitted so far.
    pub fn signals_generated(&self) -> usize {
        self.signals_generated
    }
}

impl Agent for MomentumAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "momentum"
    }

    fn description(&self) -> &str {
        "Buys on positive rate of change, sells on negative"
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
        crate::current_price(ctx)?;

        let roc = self.roc.value(ctx.history);
        let decision = if roc > self.config.threshold {
            Decision::buy(self.config.quantity)
        } else if roc < -self.config.threshold {
            Decision::sell(self.config.quantity)
        } else {
            Decision::hold()
        };

        if decision.is_actionable() {
            self.signals_generated += 1;
        }
        Ok(decision)
    }

    fn warmup_period(&self) -> usize {
        self.roc.period()
    }

    fn reset(&mut self) {
        self.signals_generated = 0;
    }
}
