//! Agent trait definitions.

use crate::error::AgentError;
use crate::types::{Decision, Ledger};
use num_traits::ToPrimitive;

/// Configuration trait for agents.
pub trait AgentConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), AgentError>;
}

/// Everything an agent may look at when deciding on one symbol.
///
/// The ledger is borrowed read-only; the driver is the only party that
/// mutates it, by applying the returned [`Decision`].
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// Step index
    pub step: u64,
    /// Symbol being decided on
    pub symbol: &'a str,
    /// Mid prices, oldest first; the last element is this step's price
    pub history: &'a [f64],
    /// Best bid this step, if the source quoted one
    pub bid: Option<f64>,
    /// Best ask this step, if the source quoted one
    pub ask: Option<f64>,
    /// The deciding agent's own ledger
    pub ledger: &'a Ledger,
}

impl<'a> DecisionContext<'a> {
    /// Create a context without a bid/ask.
    pub fn new(step: u64, symbol: &'a str, history: &'a [f64], ledger: &'a Ledger) -> Self {
        Self {
            step,
            symbol,
            history,
            bid: None,
            ask: None,
            ledger,
        }
    }

    /// Attach top-of-book prices.
    pub fn with_quote(mut self, bid: Option<f64>, ask: Option<f64>) -> Self {
        self.bid = bid;
        self.ask = ask;
        self
    }

    /// Current price (last element of the history).
    pub fn price(&self) -> Option<f64> {
        self.history.last().copied()
    }

    /// Quantity the agent holds in this symbol.
    pub fn held(&self) -> u64 {
        self.ledger.get_position(self.symbol)
    }

    /// Available cash as a float, for comparisons against prices.
    pub fn cash(&self) -> f64 {
        self.ledger.cash().to_f64().unwrap_or(0.0)
    }

    /// Whether the agent could pay for `qty` shares at the current price
    /// (before fees).
    pub fn can_afford(&self, qty: u64) -> bool {
        let price = self.ask.or_else(|| self.price()).unwrap_or(f64::INFINITY);
        self.cash() >= price * qty as f64
    }
}

/// Core agent trait.
///
/// An agent turns a price history plus a read-only view of its own ledger
/// into a [`Decision`]. Agents may keep private state (an RNG, counters),
/// hence `&mut self`. Returning `Err` makes the driver treat the step as
/// HOLD for that symbol.
pub trait Agent: Send {
    /// Unique name of this agent within a run.
    fn name(&self) -> &str;

    /// Registry key of the variant (e.g. `momentum`).
    fn kind(&self) -> &str;

    /// Decide what to do for one symbol at one step.
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError>;

    /// Number of prices needed before the agent can act.
    fn warmup_period(&self) -> usize {
        0
    }

    /// Reset private state before a new run.
    fn reset(&mut self) {}

    /// Get a description of the agent.
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;
    use rust_decimal_macros::dec;

    struct AlwaysBuy {
        name: String,
    }

    impl Agent for AlwaysBuy {
        fn name(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> &str {
            "always_buy"
        }

        fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
            if ctx.can_afford(1) {
                Ok(Decision::buy(1))
            } else {
                Ok(Decision::hold())
            }
        }
    }

    #[test]
    fn test_context_helpers() {
        let mut ledger = Ledger::new(dec!(1000), dec!(1), true);
        ledger.buy("AAPL", dec!(100), 2).unwrap();

        let history = [99.0, 100.0, 101.0];
        let ctx = DecisionContext::new(3, "AAPL", &history, &ledger);

        assert_eq!(ctx.price(), Some(101.0));
        assert_eq!(ctx.held(), 2);
        assert!((ctx.cash() - 799.0).abs() < 1e-9);
        assert!(ctx.can_afford(7));
        assert!(!ctx.can_afford(8));
    }

    #[test]
    fn test_agent_decides_from_context() {
        let ledger = Ledger::new(dec!(50), dec!(0), false);
        let mut agent = AlwaysBuy {
            name: "buyer".to_string(),
        };

        let cheap = [10.0];
        let ctx = DecisionContext::new(0, "X", &cheap, &ledger);
        assert_eq!(agent.decide(&ctx).unwrap().action, Action::Buy);

        let pricey = [100.0];
        let ctx =
            DecisionContext::new(0, "X", &pricey, &ledger).with_quote(Some(99.0), Some(101.0));
        assert_eq!(agent.decide(&ctx).unwrap(), Decision::hold());
        assert_eq!(agent.warmup_period(), 0);
    }
}
