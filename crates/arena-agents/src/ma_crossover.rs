//! Moving Average Crossover agent.
//!
//! Enters when the fast MA crosses above the slow MA and exits the whole
//! position when it crosses back below. Only the step on which the cross
//! happens triggers a trade.

use arena_core::{
    error::AgentError,
    traits::{Agent, AgentConfig, DecisionContext, Indicator},
    types::Decision,
};
use arena_indicators::{Ema, Sma};
use serde::{Deserialize, Serialize};

/// Configuration for the MA Crossover agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaCrossoverConfig {
    /// Fast moving average period
    pub fast_period: usize,
    /// Slow moving average period
    pub slow_period: usize,
    /// Use EMA instead of SMA
    pub use_ema: bool,
    /// Shares per entry
    pub quantity: u64,
}

impl Default for MaCrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: 5,
            slow_period: 20,
            use_ema: false,
            quantity: 1,
        }
    }
}

impl AgentConfig for MaCrossoverConfig {
    fn validate(&self) -> Result<(), AgentError> {
        if self.fast_period >= self.slow_period {
            return Err(AgentError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        if self.fast_period == 0 {
            return Err(AgentError::InvalidConfig(
                "Fast period must be greater than 0".into(),
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

enum MovingAverage {
    Simple(Sma),
    Exponential(Ema),
}

impl MovingAverage {
    fn new(period: usize, use_ema: bool) -> Self {
        if use_ema {
            MovingAverage::Exponential(Ema::new(period))
        } else {
            MovingAverage::Simple(Sma::new(period))
        }
    }

    fn value(&self, data: &[f64]) -> f64 {
        match self {
            MovingAverage::Simple(sma) => sma.value(data),
            MovingAverage::Exponential(ema) => ema.value(data),
        }
    }
}

/// Moving Average Crossover agent.
pub struct MaCrossoverAgent {
    name: String,
    config: MaCrossoverConfig,
    fast: MovingAverage,
    slow: MovingAverage,
}

impl MaCrossoverAgent {
    /// Create a new MA Crossover agent.
    pub fn new(name: impl Into<String>, config: MaCrossoverConfig) -> Self {
        let fast = MovingAverage::new(config.fast_period, config.use_ema);
        let slow = MovingAverage::new(config.slow_period, config.use_ema);
        Self {
            name: name.into(),
            config,
            fast,
            slow,
        }
    }

    /// fast - slow on a history.
    fn spread(&self, data: &[f64]) -> f64 {
        self.fast.value(data) - self.slow.value(data)
    }
}

impl Agent for MaCrossoverAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "ma_crossover"
    }

    fn description(&self) -> &str {
        "Trades fast/slow moving average crossovers"
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
        crate::current_price(ctx)?;
        if ctx.history.len() < self.warmup_period() {
            return Ok(Decision::hold());
        }

        let current = self.spread(ctx.history);
        let previous = self.spread(&ctx.history[..ctx.history.len() - 1]);
        let held = ctx.held();

        if current > 0.0 && previous <= 0.0 {
            if held == 0 && ctx.can_afford(self.config.quantity) {
                return Ok(Decision::buy(self.config.quantity));
            }
        } else if current < 0.0 && previous >= 0.0 && held > 0 {
            return Ok(Decision::sell(held));
        }

        Ok(Decision::hold())
    }

    fn warmup_period(&self) -> usize {
        self.config.slow_period + 1
    }
}
