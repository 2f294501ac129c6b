//! Volume indicators.

/// On-Balance Volume: volume added on up moves and subtracted on down moves.
///
/// Flat moves contribute nothing. The first volume is never counted.
pub fn obv(prices: &[f64], volumes: &[f64]) -> f64 {
    let len = prices.len().min(volumes.len());
    (1..len).fold(0.0, |obv, i| {
        if prices[i] > prices[i - 1] {
            obv + volumes[i]
        } else if prices[i] < prices[i - 1] {
            obv - volumes[i]
        } else {
            obv
        }
    })
}
