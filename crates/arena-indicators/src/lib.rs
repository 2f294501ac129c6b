//! Technical indicators for arena agents.
//!
//! Every indicator reads an oldest-first price history and returns the
//! latest value as a single `f64`:
//! - Momentum (ROC, RSI)
//! - Moving averages (SMA, EMA)
//! - Statistics (standard deviation, z-score, rolling extremes)
//! - Volatility (ATR) and volume (OBV)
//!
//! Short histories never fail. Each function returns a documented neutral
//! value instead, and agents rely on those values to stay flat while they
//! warm up.

pub mod momentum;
pub mod moving_average;
pub mod simd;
pub mod statistics;
pub mod volatility;
pub mod volume;

pub use momentum::{roc, rsi, Roc, Rsi};
pub use moving_average::{ema, sma, Ema, Sma};
pub use statistics::{rolling_high, rolling_low, std_dev, zscore, StdDev, ZScore};
pub use volatility::{atr, true_ranges};
pub use volume::obv;
