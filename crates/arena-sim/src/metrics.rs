//! End-of-run metrics.

use arena_core::types::{Ledger, PriceSeries};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Convert a float price to money, rejecting NaN and infinities.
pub(crate) fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::try_from(value).ok()
}

/// Final evaluation of one ledger against the observed prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Mark-to-market value at the last observed price per symbol
    pub final_value: Decimal,
    /// Committed trades
    pub trades: usize,
    /// Remaining cash
    pub cash: Decimal,
    /// Σ (max - min) observed price per symbol: the best a single share
    /// could have earned trading each symbol perfectly
    pub oracle_edge: Decimal,
}

/// Evaluate a ledger against the price histories of a run.
///
/// All money values are rounded to 2 decimal places.
pub fn evaluate(ledger: &Ledger, histories: &HashMap<String, PriceSeries>) -> Evaluation {
    let final_prices: HashMap<String, Decimal> = histories
        .iter()
        .filter_map(|(symbol, series)| {
            series
                .last()
                .and_then(to_decimal)
                .map(|price| (symbol.clone(), price))
        })
        .collect();

    let oracle: f64 = histories.values().map(PriceSeries::range).sum();

    Evaluation {
        final_value: ledger.value(&final_prices).round_dp(2),
        trades: ledger.trade_count(),
        cash: ledger.cash().round_dp(2),
        oracle_edge: to_decimal(oracle).unwrap_or_default().round_dp(2),
    }
}

/// Statistics over one agent's value curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveStats {
    /// Starting cash
    pub initial_value: Decimal,
    /// Last point of the curve (initial value for an empty curve)
    pub final_value: Decimal,
    /// final - initial
    pub profit: Decimal,
    /// Profit as a percentage of the initial value
    pub return_pct: Decimal,
    /// Highest value reached
    pub peak_value: Decimal,
    /// Largest peak-to-trough decline, in percent
    pub max_drawdown_pct: Decimal,
}

impl CurveStats {
    /// Compute stats for a curve that started at `initial_value`.
    pub fn from_curve(initial_value: Decimal, curve: &[Decimal]) -> Self {
        let final_value = curve.last().copied().unwrap_or(initial_value);
        let profit = final_value - initial_value;
        let return_pct = if initial_value > Decimal::ZERO {
            profit / initial_value * dec!(100)
        } else {
            Decimal::ZERO
        };

        let mut peak = initial_value;
        let mut max_drawdown = Decimal::ZERO;
        for &value in curve {
            if value > peak {
                peak = value;
            }
            if peak > Decimal::ZERO {
                let drawdown = (peak - value) / peak * dec!(100);
                if drawdown > max_drawdown {
                    max_drawdown = drawdown;
                }
            }
        }

        Self {
            initial_value,
            final_value: final_value.round_dp(2),
            profit: profit.round_dp(2),
            return_pct: return_pct.round_dp(2),
            peak_value: peak.round_dp(2),
            max_drawdown_pct: max_drawdown.round_dp(2),
        }
    }
}

/// One row of the final leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position
    pub rank: usize,
    pub agent: String,
    pub kind: String,
    pub final_value: Decimal,
    pub profit: Decimal,
    pub return_pct: Decimal,
}

/// Rank agents by final value, best first. Ties are broken by name.
pub fn rank<'a>(
    results: impl IntoIterator<Item = (&'a str, &'a str, &'a CurveStats)>,
) -> Vec<Standing> {
    let mut rows: Vec<_> = results.into_iter().collect();
    rows.sort_by(|a, b| b.2.final_value.cmp(&a.2.final_value).then_with(|| a.0.cmp(b.0)));

    rows.into_iter()
        .enumerate()
        .map(|(i, (agent, kind, stats))| Standing {
            rank: i + 1,
            agent: agent.to_string(),
            kind: kind.to_string(),
            final_value: stats.final_value,
            profit: stats.profit,
            return_pct: stats.return_pct,
        })
        .collect()
}
