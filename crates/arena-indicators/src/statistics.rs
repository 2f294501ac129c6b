//! Window statistics: standard deviation, z-score and rolling extremes.

use arena_core::traits::Indicator;
use serde::{Deserialize, Serialize};

use crate::simd::{mean_std_simd, minmax_simd};

fn tail(prices: &[f64], n: usize) -> Option<&[f64]> {
    if n == 0 || prices.len() < n {
        None
    } else {
        Some(&prices[prices.len() - n..])
    }
}

/// Population standard deviation of the last `n` prices, or 0 when the
/// history is shorter than `n`.
pub fn std_dev(prices: &[f64], n: usize) -> f64 {
    tail(prices, n)
        .and_then(mean_std_simd)
        .map(|(_, std)| std)
        .unwrap_or(0.0)
}

/// Mean and population standard deviation of the last `n` prices.
pub fn mean_std(prices: &[f64], n: usize) -> Option<(f64, f64)> {
    tail(prices, n).and_then(mean_std_simd)
}

/// How many standard deviations the last price sits from the mean of the
/// last `n` prices.
///
/// Returns 0 when the history is shorter than `n` or the window is flat.
pub fn zscore(prices: &[f64], n: usize) -> f64 {
    let Some((mean, std)) = mean_std(prices, n) else {
        return 0.0;
    };
    if std > 0.0 {
        (prices[prices.len() - 1] - mean) / std
    } else {
        0.0
    }
}

/// Highest of the last `n` prices.
pub fn rolling_high(prices: &[f64], n: usize) -> Option<f64> {
    tail(prices, n).and_then(minmax_simd).map(|(_, high)| high)
}

/// Lowest of the last `n` prices.
pub fn rolling_low(prices: &[f64], n: usize) -> Option<f64> {
    tail(prices, n).and_then(minmax_simd).map(|(low, _)| low)
}

/// Rolling population standard deviation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StdDev {
    period: usize,
}

impl StdDev {
    /// Create a new standard deviation indicator.
    ///
    /// # Panics
    /// If `period` is 0.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for StdDev {
    fn value(&self, data: &[f64]) -> f64 {
        std_dev(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "StdDev"
    }
}

/// Rolling z-score of the latest price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZScore {
    period: usize,
}

impl ZScore {
    /// Create a new z-score indicator.
    ///
    /// # Panics
    /// If `period` is 0.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for ZScore {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Indicator for ZScore {
    fn value(&self, data: &[f64]) -> f64 {
        zscore(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "ZScore"
    }
}
