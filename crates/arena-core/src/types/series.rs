//! Rolling price history for one symbol.

use serde::{Deserialize, Serialize};

/// Time-ordered mid prices for a symbol, optimized for sequential access.
///
/// The window may be bounded; the running extremes cover every price ever
/// pushed, so they stay valid after old prices are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Symbol identifier
    pub symbol: String,
    /// Prices, oldest first
    prices: Vec<f64>,
    /// Maximum retained length (0 = unlimited)
    capacity: usize,
    /// Number of prices ever pushed
    observed: usize,
    /// Lowest price ever pushed
    low: Option<f64>,
    /// Highest price ever pushed
    high: Option<f64>,
}

impl PriceSeries {
    /// Create a new unbounded series.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_capacity(symbol, 0)
    }

    /// Create a series that keeps at most `capacity` prices.
    /// When capacity is reached, the oldest prices are removed.
    pub fn with_capacity(symbol: impl Into<String>, capacity: usize) -> Self {
        Self {
            symbol: symbol.into(),
            prices: Vec::with_capacity(capacity),
            capacity,
            observed: 0,
            low: None,
            high: None,
        }
    }

    /// Push a new price, trimming the oldest if over capacity.
    pub fn push(&mut self, price: f64) {
        self.prices.push(price);
        if self.capacity > 0 && self.prices.len() > self.capacity {
            let excess = self.prices.len() - self.capacity;
            self.prices.drain(..excess);
        }

        self.observed += 1;
        self.low = Some(self.low.map_or(price, |l| l.min(price)));
        self.high = Some(self.high.map_or(price, |h| h.max(price)));
    }

    /// Push multiple prices.
    pub fn extend(&mut self, prices: impl IntoIterator<Item = f64>) {
        for price in prices {
            self.push(price);
        }
    }

    /// Number of retained prices.
    #[inline]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Retained prices as a slice, oldest first.
    #[inline]
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Most recent price.
    pub fn last(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// Number of prices ever pushed, including trimmed ones.
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Lowest price ever pushed.
    pub fn low(&self) -> Option<f64> {
        self.low
    }

    /// Highest price ever pushed.
    pub fn high(&self) -> Option<f64> {
        self.high
    }

    /// Best-case round trip over the whole run (high - low).
    pub fn range(&self) -> f64 {
        match (self.high, self.low) {
            (Some(h), Some(l)) => h - l,
            _ => 0.0,
        }
    }
}

impl FromIterator<f64> for PriceSeries {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        let mut series = PriceSeries::new(String::new());
        series.extend(iter);
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_capacity() {
        let mut series = PriceSeries::with_capacity("AAPL", 3);
        series.extend([100.0, 101.0, 102.0]);
        assert_eq!(series.len(), 3);

        series.push(103.0);
        assert_eq!(series.len(), 3);
        assert_eq!(series.prices(), &[101.0, 102.0, 103.0]);
        assert_eq!(series.observed(), 4);
    }

    #[test]
    fn test_extremes_survive_trimming() {
        let mut series = PriceSeries::with_capacity("AAPL", 2);
        series.extend([50.0, 120.0, 90.0, 95.0]);

        assert_eq!(series.prices(), &[90.0, 95.0]);
        assert_eq!(series.low(), Some(50.0));
        assert_eq!(series.high(), Some(120.0));
        assert!((series.range() - 70.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::new("X");
        assert!(series.is_empty());
        assert_eq!(series.last(), None);
        assert_eq!(series.range(), 0.0);
    }
}
