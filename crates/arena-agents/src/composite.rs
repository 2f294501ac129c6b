//! Composite voting agent.
//!
//! Combines four independent readings into a score in `[-4, 4]`:
//! - momentum: ROC above/below a threshold
//! - RSI: oversold votes up, overbought votes down
//! - z-score: stretched below the mean votes up, above votes down
//! - trend: fast EMA above/below slow EMA

use arena_core::{
    error::AgentError,
    traits::{Agent, AgentConfig, DecisionContext, Indicator},
    types::Decision,
};
use arena_indicators::{Ema, Roc, Rsi, ZScore};
use serde::{Deserialize, Serialize};

/// Configuration for the composite agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositeConfig {
    /// ROC lookback
    pub roc_lookback: usize,
    /// Minimum |ROC| for a momentum vote
    pub roc_threshold: f64,
    /// RSI period
    pub rsi_period: usize,
    /// RSI oversold level
    pub oversold: f64,
    /// RSI overbought level
    pub overbought: f64,
    /// Z-score window
    pub zscore_period: usize,
    /// Minimum |z| for a stretch vote
    pub zscore_threshold: f64,
    /// Fast EMA period
    pub fast_ema_period: usize,
    /// Slow EMA period
    pub slow_ema_period: usize,
    /// Votes needed to act (1..=4)
    pub min_score: i32,
    /// Shares per entry
    pub quantity: u64,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            roc_lookback: 5,
            roc_threshold: 0.01,
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
            zscore_period: 20,
            zscore_threshold: 2.0,
            fast_ema_period: 12,
            slow_ema_period: 26,
            min_score: 2,
            quantity: 1,
        }
    }
}

impl AgentConfig for CompositeConfig {
    fn validate(&self) -> Result<(), AgentError> {
        if self.roc_lookback == 0 || self.rsi_period == 0 || self.zscore_period < 2 {
            return Err(AgentError::InvalidConfig(
                "Indicator periods must be positive (z-score needs at least 2)".into(),
            ));
        }
        if self.fast_ema_period == 0 || self.fast_ema_period >= self.slow_ema_period {
            return Err(AgentError::InvalidConfig(
                "Fast EMA period must be positive and less than slow EMA period".into(),
            ));
        }
        if self.oversold >= self.overbought {
            return Err(AgentError::InvalidConfig(
                "Oversold level must be below overbought level".into(),
            ));
        }
        if !(1..=4).contains(&self.min_score) {
            return Err(AgentError::InvalidConfig(
                "Minimum score must be between 1 and 4".into(),
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

fn vote(bullish: bool, bearish: bool) -> i32 {
    match (bullish, bearish) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}

/// Multi-indicator voting agent.
pub struct CompositeAgent {
    name: String,
    config: CompositeConfig,
    roc: Roc,
    rsi: Rsi,
    zscore: ZScore,
    fast_ema: Ema,
    slow_ema: Ema,
    last_score: Option<i32>,
}

impl CompositeAgent {
    /// Create a new composite agent.
    pub fn new(name: impl Into<String>, config: CompositeConfig) -> Self {
        Self {
            name: name.into(),
            roc: Roc::new(config.roc_lookback),
            rsi: Rsi::new(config.rsi_period),
            zscore: ZScore::new(config.zscore_period),
            fast_ema: Ema::new(config.fast_ema_period),
            slow_ema: Ema::new(config.slow_ema_period),
            config,
            last_score: None,
        }
    }

    /// Sum of the four votes for a history.
    pub fn score(&self, history: &[f64]) -> i32 {
        let cfg = &self.config;

        let roc = self.roc.value(history);
        let rsi = self.rsi.value(history);
        let z = self.zscore.value(history);
        let trend = self.fast_ema.value(history) - self.slow_ema.value(history);

        vote(roc > cfg.roc_threshold, roc < -cfg.roc_threshold)
            + vote(rsi < cfg.oversold, rsi > cfg.overbought)
            + vote(z < -cfg.zscore_threshold, z > cfg.zscore_threshold)
            + vote(trend > 0.0, trend < 0.0)
    }

    /// Score from the most recent decision after warmup.
    pub fn last_score(&self) -> Option<i32> {
        self.last_score
    }
}

impl Agent for CompositeAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "composite"
    }

    fn description(&self) -> &str {
        "Votes across ROC, RSI, z-score and EMA trend"
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
        crate::current_price(ctx)?;
        if ctx.history.len() < self.warmup_period() {
            return Ok(Decision::hold());
        }

        let score = self.score(ctx.history);
        self.last_score = Some(score);
        let held = ctx.held();

        if score >= self.config.min_score && ctx.can_afford(self.config.quantity) {
            Ok(Decision::buy(self.config.quantity))
        } else if score <= -self.config.min_score && held > 0 {
            Ok(Decision::sell(held))
        } else {
            Ok(Decision::hold())
        }
    }

    fn warmup_period(&self) -> usize {
        [
            self.roc.period(),
            self.rsi.period(),
            self.zscore.period(),
            self.slow_ema.period(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    fn reset(&mut self) {
        self.last_score = None;
    }
}
