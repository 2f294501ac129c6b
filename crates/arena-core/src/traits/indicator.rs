//! Indicator trait definitions.

/// Trait for configured point-value indicators.
///
/// Parameters are fixed at construction; `value` reads the most recent
/// reading from an oldest-first price history. Implementations return a
/// neutral fallback instead of failing when the history is too short.
pub trait Indicator: Send + Sync {
    /// Latest indicator value for the given history.
    fn value(&self, data: &[f64]) -> f64;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Whether the history is long enough for a real reading.
    fn is_ready(&self, data: &[f64]) -> bool {
        data.len() >= self.period()
    }
}
