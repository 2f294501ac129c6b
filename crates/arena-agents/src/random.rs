//! Random agent.
//!
//! Picks BUY, SELL or HOLD uniformly at random. Serves as the baseline every
//! other agent should beat. Seeding makes runs reproducible.

use arena_core::{
    error::AgentError,
    traits::{Agent, AgentConfig, DecisionContext},
    types::Decision,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for the random agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RandomConfig {
    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Shares per trade
    pub quantity: u64,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            seed: None,
            quantity: 1,
        }
    }
}

impl AgentConfig for RandomConfig {
    fn validate(&self) -> Result<(), AgentError> {
        if self.quantity == 0 {
            return Err(AgentError::InvalidConfig(
                "Quantity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Uniformly random agent.
pub struct RandomAgent {
    name: String,
    config: RandomConfig,
    rng: StdRng,
}

impl RandomAgent {
    /// Create a new random agent, seeded from the config or the OS.
    pub fn new(name: impl Into<String>, config: RandomConfig) -> Self {
        let rng = Self::make_rng(config.seed);
        Self {
            name: name.into(),
            config,
            rng,
        }
    }

    /// Create a new random agent with a specific seed (for reproducible runs).
    pub fn with_seed(name: impl Into<String>, config: RandomConfig, seed: u64) -> Self {
        Self::new(
            name,
            RandomConfig {
                seed: Some(seed),
                ..config
            },
        )
    }

    fn make_rng(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "random"
    }

    fn description(&self) -> &str {
        "Uniformly random buy/sell/hold baseline"
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision, AgentError> {
        crate::current_price(ctx)?;

        let decision = match self.rng.random_range(0..3u8) {
            0 => Decision::buy(self.config.quantity),
            1 => Decision::sell(self.config.quantity),
            _ => Decision::hold(),
        };
        Ok(decision)
    }

    /// Re-seeds from the configured seed so a reset agent replays the same
    /// decision sequence.
    fn reset(&mut self) {
        self.rng = Self::make_rng(self.config.seed);
    }
}
