//! RSI mean reversion agent.
//!
//! Buys when RSI signals oversold and sells when RSI signals overbought,
//! either the whole position or `quantity` shares at a time.

use arena_core::{
    error::AgentError,
    traits::{Agent, AgentConfig, DecisionContext, Indicator},
    types::Decision,
};
use arena_indicators::Rsi;
use serde::{Deserialize, Serialize};

/// Configuration for the RSI mean reversion agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RsiReversionConfig {
    /// RSI period
    pub period: usize,
    /// Buy below this level
    pub oversold: f64,
    /// Sell above this level
    pub overbought: f64,
    /// Shares per entry
    pub quantity: u64,
    /// Only enter when flat and the entry is affordable
    pub require_flat: bool,
    /// Sell the whole holding when overbought; otherwise sell `quantity`
    pub exit_all: bool,
}

impl Default for RsiReversionConfig {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            quantity: 1,
            require_flat: true,
            exit_all: true,
        }
    }
}

impl AgentConfig for RsiReversionConfig {
    fn validate(&self) -> Result<(), AgentError> {
        if self.period == 0 {
            return Err(AgentError::InvalidConfig(
                "RSI period must be greater than 0".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.oversold) || !(0.0..=100.0).contains(&self.overbought) {
            return Err(AgentError::InvalidConfig(
                "RSI levels must be between 0 and 100".into(),
            ));
        }
        if self.oversold >= self.overbought {
            return Err(AgentError::InvalidConfig(
                "Oversold level must be below overbought level".into(),
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

/// RSI mean reversion agent.
pub struct RsiReversionAgent {
    name: String,
    config: RsiReversionConfig,
    rsi: Rsi,
    last_rsi: Option<f64>,
}

impl RsiReversionAgent {
    /// Create a new RSI mean reversion agent.
    pub fn new(name: impl Into<String>, config: RsiReversionConfig) -> Self {
        let rsi = Rsi::new(config.period);
        Self {
            name: name.into(),
            config,
            rsi,
            last_rsi: None,
        }
    }

    /// RSI seen on the most recent decision after warmup.
    pub fn last_rsi(&self) -> Option<f64> {
        self.last_rsi
    }
}

impl Agent for RsiReversionAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "rsi_reversion"
    }

    fn description(&self) -> &str {
        "Buys RSI oversold dips, sells when overbought"
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
        crate::current_price(ctx)?;

        if !self.rsi.is_ready(ctx.history) {
            return Ok(Decision::hold());
        }

        let rsi = self.rsi.value(ctx.history);
        self.last_rsi = Some(rsi);
        let held = ctx.held();

        if rsi < self.config.oversold {
            let may_enter = !self.config.require_flat
                || (held == 0 && ctx.can_afford(self.config.quantity));
            if may_enter {
                return Ok(Decision::buy(self.config.quantity));
            }
        } else if rsi > self.config.overbought && held > 0 {
            let qty = if self.config.exit_all {
                held
            } else {
                self.config.quantity.min(held)
            };
            return Ok(Decision::sell(qty));
        }

        Ok(Decision::hold())
    }

    fn warmup_period(&self) -> usize {
        self.rsi.period()
    }

    fn reset(&mut self) {
        self.last_rsi = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::decide;
    use arena_core::Ledger;
    use rust_decimal_macros::dec;

    fn falling(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 - i as f64).collect()
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 50.0 + i as f64).collect()
    }

    #[test]
    fn test_config_validation() {
        assert!(RsiReversionConfig::default().validate().is_ok());

        let config = RsiReversionConfig {
            oversold: 70.0,
            overbought: 30.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RsiReversionConfig {
            overbought: 120.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_holds_until_period_plus_one() {
        let ledger = Ledger::default();
        let mut agent = RsiReversionAgent::new("rsi", RsiReversionConfig::default());

        assert_eq!(decide(&mut agent, &falling(14), &ledger), Decision::hold());
        assert!(agent.last_rsi().is_none());
        assert_eq!(decide(&mut agent, &falling(15), &ledger), Decision::buy(1));
        assert_eq!(agent.last_rsi(), Some(0.0));
    }

    #[test]
    fn test_no_entry_when_already_holding() {
        let mut ledger = Ledger::default();
        ledger.buy("TEST", dec!(90), 1).unwrap();

        let mut agent = RsiReversionAgent::new("rsi", RsiReversionConfig::default());
        assert_eq!(decide(&mut agent, &falling(20), &ledger), Decision::hold());

        let config = RsiReversionConfig {
            require_flat: false,
            ..Default::default()
        };
        let mut agent = RsiReversionAgent::new("copilot", config);
        assert_eq!(decide(&mut agent, &falling(20), &ledger), Decision::buy(1));
    }

    #[test]
    fn test_no_entry_when_unaffordable() {
        let ledger = Ledger::new(dec!(10), dec!(1), true);
        let mut agent = RsiReversionAgent::new("rsi", RsiReversionConfig::default());
        assert_eq!(decide(&mut agent, &falling(20), &ledger), Decision::hold());
    }

    #[test]
    fn test_sells_entire_holding_when_overbought() {
        let mut ledger = Ledger::default();
        ledger.buy("TEST", dec!(50), 3).unwrap();

        let mut agent = RsiReversionAgent::new("rsi", RsiReversionConfig::default());
        assert_eq!(decide(&mut agent, &rising(20), &ledger), Decision::sell(3));

        // Nothing to sell when flat
        let flat = Ledger::default();
        assert_eq!(decide(&mut agent, &rising(20), &flat), Decision::hold());
    }

    #[test]
    fn test_scales_out_without_exit_all() {
        let mut ledger = Ledger::default();
        ledger.buy("TEST", dec!(50), 3).unwrap();

        // one share at a time, entering again on every dip
        let config = RsiReversionConfig {
            require_flat: false,
            exit_all: false,
            ..Default::default()
        };
        let mut agent = RsiReversionAgent::new("one_share", config);
        assert_eq!(decide(&mut agent, &rising(20), &ledger), Decision::sell(1));
        assert_eq!(decide(&mut agent, &falling(20), &ledger), Decision::buy(1));

        let config = RsiReversionConfig {
            quantity: 5,
            exit_all: false,
            ..Default::default()
        };
        let mut agent = RsiReversionAgent::new("capped", config);
        assert_eq!(decide(&mut agent, &rising(20), &ledger), Decision::sell(3));
    }
}
