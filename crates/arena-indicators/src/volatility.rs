//! Volatility indicators.

/// True range for every bar after the first.
///
/// `max(high - low, |high - prev_close|, |low - prev_close|)`. Inputs of
/// different lengths are truncated to the shortest.
pub fn true_ranges(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let len = highs.len().min(lows.len()).min(closes.len());
    (1..len)
        .map(|i| {
            let prev_close = closes[i - 1];
            (highs[i] - lows[i])
                .max((highs[i] - prev_close).abs())
                .max((lows[i] - prev_close).abs())
        })
        .collect()
}

/// Average True Range: mean of the last `n` true ranges.
///
/// Returns 0 when fewer than `n` true ranges exist.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], n: usize) -> f64 {
    let trs = true_ranges(highs, lows, closes);
    if n == 0 || trs.len() < n {
        return 0.0;
    }
    crate::simd::sum_simd(&trs[trs.len() - n..]) / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_ranges() {
        let highs = [10.0, 12.0, 11.0];
        let lows = [9.0, 10.0, 8.0];
        let closes = [9.5, 11.5, 9.0];

        let trs = true_ranges(&highs, &lows, &closes);
        assert_eq!(trs.len(), 2);
        // max(2, 2.5, 0.5)
        assert!((trs[0] - 2.5).abs() < 1e-12);
        // max(3, 0.5, 3.5)
        assert!((trs[1] - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_atr() {
        let highs = [10.0, 12.0, 11.0];
        let lows = [9.0, 10.0, 8.0];
        let closes = [9.5, 11.5, 9.0];

        assert!((atr(&highs, &lows, &closes, 2) - 3.0).abs() < 1e-12);
        assert!((atr(&highs, &lows, &closes, 1) - 3.5).abs() < 1e-12);
        assert_eq!(atr(&highs, &lows, &closes, 3), 0.0);
    }
}
