//! Momentum indicators.

use arena_core::traits::Indicator;
use serde::{Deserialize, Serialize};

/// Rate of change over `n` steps, as a fraction (0.01 = +1%).
///
/// Returns 0 when the history holds fewer than `n + 1` prices, or when the
/// base price is 0.
pub fn roc(prices: &[f64], n: usize) -> f64 {
    if prices.len() < n + 1 {
        return 0.0;
    }
    let last = prices[prices.len() - 1];
    let base = prices[prices.len() - 1 - n];
    if base == 0.0 {
        return 0.0;
    }
    (last - base) / base
}

/// Relative Strength Index over the last `n` price changes.
///
/// Uses plain sums of gains and losses (no Wilder smoothing).
/// Returns 50 when the history holds fewer than `n + 1` prices and 100 when
/// the window has no losses at all, flat windows included.
pub fn rsi(prices: &[f64], n: usize) -> f64 {
    if prices.len() < n + 1 {
        return 50.0;
    }

    let window = &prices[prices.len() - (n + 1)..];
    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(gains, losses), delta| {
            if delta > 0.0 {
                (gains + delta, losses)
            } else {
                (gains, losses - delta)
            }
        });

    if losses == 0.0 {
        return 100.0;
    }
    let rs = gains / losses;
    100.0 - (100.0 / (1.0 + rs))
}

/// Rate of change with a fixed lookback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Roc {
    lookback: usize,
}

impl Roc {
    /// Create a new ROC indicator.
    ///
    /// # Panics
    /// If `lookback` is 0.
    pub fn new(lookback: usize) -> Self {
        assert!(lookback > 0, "Lookback must be greater than 0");
        Self { lookback }
    }
}

impl Indicator for Roc {
    fn value(&self, data: &[f64]) -> f64 {
        roc(data, self.lookback)
    }

    fn period(&self) -> usize {
        self.lookback + 1
    }

    fn name(&self) -> &str {
        "ROC"
    }
}

/// Relative Strength Index.
///
/// Measures the balance of recent gains and losses to flag overbought or
/// oversold conditions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    ///
    /// # Panics
    /// If `period` is 0.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    fn value(&self, data: &[f64]) -> f64 {
        rsi(data, self.period)
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roc() {
        let prices = [100.0, 101.0, 102.0, 103.0, 104.0, 110.0];
        assert!((roc(&prices, 5) - 0.10).abs() < 1e-12);
        assert!((roc(&prices, 1) - (110.0 - 104.0) / 104.0).abs() < 1e-12);
    }

    #[test]
    fn test_roc_short_history_and_zero_base() {
        assert_eq!(roc(&[100.0, 101.0], 5), 0.0);
        assert_eq!(roc(&[], 1), 0.0);
        assert_eq!(roc(&[0.0, 5.0], 1), 0.0);
    }

    #[test]
    fn test_rsi_short_history_is_neutral() {
        let prices: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&prices, 14), 50.0);
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        let prices = [100.0; 15];
        assert_eq!(rsi(&prices, 14), 100.0);
    }

    #[test]
    fn test_rsi_values() {
        // Only gains
        let up: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&up, 14), 100.0);

        // Only losses
        let down: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert!(rsi(&down, 14).abs() < 1e-12);

        // Gains 2, losses 1 -> rs 2 -> 66.67
        let mixed = [10.0, 12.0, 11.0];
        assert!((rsi(&mixed, 2) - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_only_uses_last_window() {
        // Big drop early on, then steady gains over the last 3 changes
        let prices = [100.0, 50.0, 51.0, 52.0, 53.0];
        assert_eq!(rsi(&prices, 3), 100.0);
    }

    #[test]
    fn test_rsi_bounds() {
        let data: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();
        for end in 1..=data.len() {
            let value = rsi(&data[..end], 14);
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_indicator_structs() {
        let prices = [100.0, 101.0, 102.0, 103.0, 104.0, 110.0];
        let roc5 = Roc::new(5);
        assert!(roc5.is_ready(&prices));
        assert!((roc5.value(&prices) - 0.10).abs() < 1e-12);
        assert_eq!(roc5.name(), "ROC");

        let rsi14 = Rsi::default();
        assert_eq!(rsi14.period(), 15);
        assert!(!rsi14.is_ready(&prices));
        assert_eq!(rsi14.value(&prices), 50.0);
    }
}
