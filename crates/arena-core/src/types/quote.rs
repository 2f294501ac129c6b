//! Price observations delivered to the arena each step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single price observation for one symbol.
///
/// Either a last/mid price, or a bid/ask pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Quote {
    /// Last traded (or already-mid) price
    Last { price: f64 },
    /// Top of book
    BidAsk { bid: f64, ask: f64 },
}

impl Quote {
    /// Create a last-price quote.
    pub fn last(price: f64) -> Self {
        Quote::Last { price }
    }

    /// Create a bid/ask quote.
    pub fn bid_ask(bid: f64, ask: f64) -> Self {
        Quote::BidAsk { bid, ask }
    }

    /// Get the mid price.
    pub fn mid(&self) -> f64 {
        match *self {
            Quote::Last { price } => price,
            Quote::BidAsk { bid, ask } => (bid + ask) / 2.0,
        }
    }

    /// Best bid, if this quote carries one.
    pub fn bid(&self) -> Option<f64> {
        match *self {
            Quote::Last { .. } => None,
            Quote::BidAsk { bid, .. } => Some(bid),
        }
    }

    /// Best ask, if this quote carries one.
    pub fn ask(&self) -> Option<f64> {
        match *self {
            Quote::Last { .. } => None,
            Quote::BidAsk { ask, .. } => Some(ask),
        }
    }

    /// Price a market buy fills at: the ask, or the last price.
    pub fn buy_price(&self) -> f64 {
        self.ask().unwrap_or_else(|| self.mid())
    }

    /// Price a market sell fills at: the bid, or the last price.
    pub fn sell_price(&self) -> f64 {
        self.bid().unwrap_or_else(|| self.mid())
    }

    /// Get the spread (0 for last-price quotes).
    pub fn spread(&self) -> f64 {
        match *self {
            Quote::Last { .. } => 0.0,
            Quote::BidAsk { bid, ask } => ask - bid,
        }
    }

    /// A quote is usable when its mid is finite and positive.
    pub fn is_valid(&self) -> bool {
        let mid = self.mid();
        mid.is_finite() && mid > 0.0
    }
}

/// Three-valued observation handed to the core by a price source.
///
/// Sources convert their own failures into this signal; the core never
/// fabricates a price for a symbol that is not `Fresh`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Observation {
    /// A current quote
    Fresh { quote: Quote },
    /// The source only has an outdated quote
    Stale { quote: Quote },
    /// Nothing available for this step
    Unavailable,
}

impl Observation {
    /// Wrap a fresh quote.
    pub fn fresh(quote: Quote) -> Self {
        Observation::Fresh { quote }
    }

    /// Wrap a stale quote.
    pub fn stale(quote: Quote) -> Self {
        Observation::Stale { quote }
    }

    /// The quote if (and only if) it is fresh and valid.
    pub fn usable(&self) -> Option<Quote> {
        match self {
            Observation::Fresh { quote } if quote.is_valid() => Some(*quote),
            _ => None,
        }
    }
}

/// One step's worth of observations across all symbols.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Step index assigned by the source
    pub step: u64,
    /// Optional wall-clock timestamp (Unix milliseconds)
    pub timestamp: Option<i64>,
    /// Observation per symbol
    pub observations: BTreeMap<String, Observation>,
}

impl Snapshot {
    /// Create an empty snapshot for a step.
    pub fn new(step: u64) -> Self {
        Self {
            step,
            timestamp: None,
            observations: BTreeMap::new(),
        }
    }

    /// Attach a timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Add an observation for a symbol.
    pub fn with(mut self, symbol: impl Into<String>, observation: Observation) -> Self {
        self.observations.insert(symbol.into(), observation);
        self
    }

    /// Add a fresh last-price observation.
    pub fn with_price(self, symbol: impl Into<String>, price: f64) -> Self {
        self.with(symbol, Observation::fresh(Quote::last(price)))
    }

    /// Snapshot where every requested symbol is unavailable.
    pub fn unavailable(step: u64, symbols: &[String]) -> Self {
        let observations = symbols
            .iter()
            .map(|s| (s.clone(), Observation::Unavailable))
            .collect();
        Self {
            step,
            timestamp: None,
            observations,
        }
    }

    /// Observation for a symbol; missing symbols read as unavailable.
    pub fn get(&self, symbol: &str) -> Observation {
        self.observations
            .get(symbol)
            .copied()
            .unwrap_or(Observation::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_prices() {
        let quote = Quote::bid_ask(99.5, 100.5);
        assert!((quote.mid() - 100.0).abs() < 1e-12);
        assert_eq!(quote.buy_price(), 100.5);
        assert_eq!(quote.sell_price(), 99.5);
        assert!((quote.spread() - 1.0).abs() < 1e-12);

        let last = Quote::last(42.0);
        assert_eq!(last.buy_price(), 42.0);
        assert_eq!(last.sell_price(), 42.0);
        assert_eq!(last.bid(), None);
    }

    #[test]
    fn test_observation_usable() {
        assert!(Observation::fresh(Quote::last(10.0)).usable().is_some());
        assert!(Observation::fresh(Quote::last(0.0)).usable().is_none());
        assert!(Observation::fresh(Quote::last(f64::NAN)).usable().is_none());
        assert!(Observation::stale(Quote::last(10.0)).usable().is_none());
        assert!(Observation::Unavailable.usable().is_none());
    }

    #[test]
    fn test_snapshot_missing_symbol_is_unavailable() {
        let snapshot = Snapshot::new(0).with_price("AAPL", 150.0);
        assert_eq!(snapshot.get("MSFT"), Observation::Unavailable);
        assert!(snapshot.get("AAPL").usable().is_some());
    }
}
