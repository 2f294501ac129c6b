//! Moving average indicators.

use arena_core::traits::Indicator;
use serde::{Deserialize, Serialize};

use crate::simd::sum_simd;

/// Simple moving average of the last `n` prices.
///
/// Returns the last price when the history is shorter than `n`, and 0 for
/// an empty history.
pub fn sma(prices: &[f64], n: usize) -> f64 {
    if n == 0 || prices.len() < n {
        return prices.last().copied().unwrap_or(0.0);
    }
    sum_simd(&prices[prices.len() - n..]) / n as f64
}

/// Exponential moving average with `alpha = 2 / (n + 1)`.
///
/// Seeds with the first price and folds over the whole history. Returns the
/// last price when the history is shorter than `n`, and 0 for an empty
/// history.
pub fn ema(prices: &[f64], n: usize) -> f64 {
    let Some((&first, rest)) = prices.split_first() else {
        return 0.0;
    };
    if prices.len() < n {
        return prices[prices.len() - 1];
    }

    let alpha = 2.0 / (n as f64 + 1.0);
    rest.iter()
        .fold(first, |ema, &price| alpha * price + (1.0 - alpha) * ema)
}

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of prices over a specified period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the given period.
    ///
    /// # Panics
    /// If `period` is 0.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Sma {
    fn value(&self, data: &[f64]) -> f64 {
        sma(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ema {
    period: usize,
}

impl Ema {
    /// Create a new EMA with the given period.
    ///
    /// # Panics
    /// If `period` is 0.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Smoothing factor.
    pub fn alpha(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn value(&self, data: &[f64]) -> f64 {
        ema(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert!((sma(&data, 3) - 9.0).abs() < 1e-10);
        assert!((sma(&data, 10) - 5.5).abs() < 1e-10);
    }

    #[test]
    fn test_sma_fallbacks() {
        assert_eq!(sma(&[], 5), 0.0);
        assert_eq!(sma(&[4.0, 7.0], 5), 7.0);
    }

    #[test]
    fn test_ema_seeds_with_first_price() {
        // alpha = 0.5 for n = 3
        // 1 -> 0.5*2 + 0.5*1 = 1.5 -> 0.5*3 + 0.5*1.5 = 2.25
        let data = [1.0, 2.0, 3.0];
        assert!((ema(&data, 3) - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_ema_fallbacks() {
        assert_eq!(ema(&[], 5), 0.0);
        assert_eq!(ema(&[10.0, 11.0], 5), 11.0);
    }

    #[test]
    fn test_ema_constant_series() {
        let data = [42.0; 30];
        assert!((ema(&data, 10) - 42.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_responds_faster_than_sma() {
        let mut data = vec![100.0; 20];
        data.extend([110.0, 120.0, 130.0]);
        assert!(ema(&data, 5) > sma(&data, 20));
    }

    #[test]
    fn test_structs() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sma3 = Sma::new(3);
        assert!((sma3.value(&data) - 4.0).abs() < 1e-12);
        assert_eq!(sma3.period(), 3);

        let ema3 = Ema::new(3);
        assert!((ema3.alpha() - 0.5).abs() < 1e-12);
        assert_eq!(ema3.value(&data[..2]), 2.0);
        assert_eq!(ema3.name(), "EMA");
    }
}
