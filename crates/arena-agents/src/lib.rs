//! Trading agent implementations.
//!
//! This crate provides the agents that compete in an arena run:
//! - Momentum (rate of change)
//! - RSI mean reversion
//! - Channel breakout and volatility (band) breakout
//! - Moving average crossover
//! - Consecutive-move trend following
//! - Composite multi-indicator voting
//! - Random (seedable baseline)

mod breakout;
mod composite;
mod ma_crossover;
mod momentum;
mod random;
mod registry;
mod rsi_reversion;
mod trend;
mod volatility_breakout;

pub use breakout::{BreakoutAgent, BreakoutConfig};
pub use composite::{CompositeAgent, CompositeConfig};
pub use ma_crossover::{MaCrossoverAgent, MaCrossoverConfig};
pub use momentum::{MomentumAgent, MomentumConfig};
pub use random::{RandomAgent, RandomConfig};
pub use registry::{AgentInfo, AgentRegistry};
pub use rsi_reversion::{RsiReversionAgent, RsiReversionConfig};
pub use trend::{TrendAgent, TrendConfig};
pub use volatility_breakout::{VolatilityBreakoutAgent, VolatilityBreakoutConfig};

use arena_core::{error::AgentError, traits::DecisionContext};

/// Current price for the context, or an error for an empty history.
pub(crate) fn current_price(ctx: &DecisionContext<'_>) -> Result<f64, AgentError> {
    ctx.price()
        .filter(|p| p.is_finite())
        .ok_or_else(|| AgentError::DecisionFailed(format!("no usable price for {}", ctx.symbol)))
}

#[cfg(test)]
pub(crate) mod testing {
    use arena_core::{traits::Agent, types::Decision, DecisionContext, Ledger};

    /// Run an agent over every prefix of `prices`, returning its decisions.
    pub fn replay(agent: &mut dyn Agent, prices: &[f64], ledger: &Ledger) -> Vec<Decision> {
        (1..=prices.len())
            .map(|end| {
                let ctx = DecisionContext::new(end as u64, "TEST", &prices[..end], ledger);
                agent.decide(&ctx).unwrap()
            })
            .collect()
    }

    /// Single decision on the full history.
    pub fn decide(agent: &mut dyn Agent, prices: &[f64], ledger: &Ledger) -> Decision {
        let ctx = DecisionContext::new(prices.len() as u64, "TEST", prices, ledger);
        agent.decide(&ctx).unwrap()
    }
}
