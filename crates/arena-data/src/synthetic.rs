//! Seeded random-walk price source.
//!
//! Produces geometric random-walk quotes with optional bid/ask spread and
//! injected gaps, so runs can be exercised without any market data.

use arena_core::error::DataError;
use arena_core::traits::PriceSource;
use arena_core::types::{Observation, Quote, Snapshot};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for the synthetic walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Number of steps before the source is exhausted
    pub steps: u64,
    /// Starting price for every symbol
    pub start_price: f64,
    /// Per-step drift of log returns
    pub drift: f64,
    /// Per-step standard deviation of log returns
    pub volatility: f64,
    /// Relative bid/ask spread; 0 quotes last prices only
    pub spread: f64,
    /// Probability that a symbol is unavailable on a step
    pub gap_probability: f64,
    /// Probability that a symbol repeats its previous quote as stale
    pub stale_probability: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: None,
            steps: 390,
            start_price: 100.0,
            drift: 0.0,
            volatility: 0.002,
            spread: 0.0,
            gap_probability: 0.0,
            stale_probability: 0.0,
        }
    }
}

impl SyntheticConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), DataError> {
        if !(self.start_price.is_finite() && self.start_price > 0.0) {
            return Err(DataError::Internal("start_price must be positive".into()));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) || !self.drift.is_finite() {
            return Err(DataError::Internal(
                "drift and volatility must be finite, volatility non-negative".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.spread) {
            return Err(DataError::Internal("spread must be in [0, 1)".into()));
        }
        for p in [self.gap_probability, self.stale_probability] {
            if !(0.0..=1.0).contains(&p) {
                return Err(DataError::Internal(
                    "probabilities must be between 0 and 1".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Seeded geometric random walk over any requested symbols.
pub struct SyntheticSource {
    config: SyntheticConfig,
    rng: StdRng,
    returns: Normal<f64>,
    prices: HashMap<String, f64>,
    last_quotes: HashMap<String, Quote>,
    step: u64,
}

impl SyntheticSource {
    /// Create a new synthetic source.
    pub fn new(config: SyntheticConfig) -> Result<Self, DataError> {
        config.validate()?;
        let returns = Normal::new(config.drift, config.volatility)
            .map_err(|e| DataError::Internal(e.to_string()))?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            rng,
            returns,
            prices: HashMap::new(),
            last_quotes: HashMap::new(),
            step: 0,
        })
    }

    /// Create a new synthetic source with a specific seed.
    pub fn with_seed(config: SyntheticConfig, seed: u64) -> Result<Self, DataError> {
        Self::new(SyntheticConfig {
            seed: Some(seed),
            ..config
        })
    }

    fn quote_for(&self, price: f64) -> Quote {
        if self.config.spread > 0.0 {
            let half = price * self.config.spread / 2.0;
            Quote::bid_ask(price - half, price + half)
        } else {
            Quote::last(price)
        }
    }

    fn observe(&mut self, symbol: &str) -> Observation {
        // The walk always advances so gaps do not freeze the price.
        let start = self.config.start_price;
        let shock = self.returns.sample(&mut self.rng);
        let price = self.prices.entry(symbol.to_string()).or_insert(start);
        *price *= shock.exp();
        let price = *price;

        if self.rng.random_bool(self.config.gap_probability) {
            return Observation::Unavailable;
        }
        if self.rng.random_bool(self.config.stale_probability) {
            if let Some(previous) = self.last_quotes.get(symbol) {
                return Observation::stale(*previous);
            }
        }

        let quote = self.quote_for(price);
        self.last_quotes.insert(symbol.to_string(), quote);
        Observation::fresh(quote)
    }
}

#[async_trait]
impl PriceSource for SyntheticSource {
    async fn next_snapshot(&mut self, symbols: &[String]) -> Result<Option<Snapshot>, DataError> {
        if self.step >= self.config.steps {
            return Ok(None);
        }

        let mut snapshot = Snapshot::new(self.step);
        for symbol in symbols {
            let observation = self.observe(symbol);
            snapshot.observations.insert(symbol.clone(), observation);
        }
        self.step += 1;
        Ok(Some(snapshot))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
