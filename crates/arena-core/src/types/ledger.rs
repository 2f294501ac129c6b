//! Per-agent ledger: cash, open positions and trade history.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{Side, Trade};
use crate::error::OrderRejected;

/// An open long position in a single symbol.
///
/// Only exists while `qty > 0`; the ledger removes it when it closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol
    pub symbol: String,
    /// Shares held
    pub qty: u64,
    /// Quantity-weighted mean price of the open buy lots
    pub avg_price: Decimal,
}

impl Position {
    /// Create a new position.
    pub fn new(symbol: impl Into<String>, qty: u64, avg_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            avg_price,
        }
    }

    /// Cost basis (qty * avg_price).
    pub fn cost_basis(&self) -> Decimal {
        Decimal::from(self.qty) * self.avg_price
    }

    /// Value at a market price, falling back to cost basis when the price is
    /// missing or non-positive.
    pub fn mark(&self, market_price: Option<Decimal>) -> Decimal {
        match market_price {
            Some(price) if price > Decimal::ZERO => Decimal::from(self.qty).saturating_mul(price),
            _ => self.cost_basis(),
        }
    }

    /// Unrealized P&L at a market price.
    pub fn unrealized_pnl(&self, market_price: Decimal) -> Decimal {
        (market_price - self.avg_price) * Decimal::from(self.qty)
    }

    /// Quantity and re-weighted average price after adding a buy lot, or
    /// `None` when either does not fit.
    fn with_lot(&self, qty: u64, price: Decimal) -> Option<(u64, Decimal)> {
        let new_qty = self.qty.checked_add(qty)?;
        let held = self.avg_price.checked_mul(Decimal::from(self.qty))?;
        let lot = price.checked_mul(Decimal::from(qty))?;
        let avg_price = held.checked_add(lot)?.checked_div(Decimal::from(new_qty))?;
        Some((new_qty, avg_price))
    }
}

/// Per-symbol aggregate of a ledger's trade history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolSummary {
    pub buys: usize,
    pub sells: usize,
    pub bought_qty: u64,
    pub sold_qty: u64,
    /// Σ qty*price + fee over buys
    pub total_cost: Decimal,
    /// Σ qty*price - fee over sells
    pub total_revenue: Decimal,
    /// revenue - cost
    pub realized_pnl: Decimal,
    /// Shares still open
    pub open_qty: u64,
    /// (market - avg) * open_qty; only set when prices were supplied
    pub unrealized_pnl: Option<Decimal>,
    /// realized + unrealized
    pub total_pnl: Decimal,
    /// total_pnl / total_cost * 100, or 0 when nothing was bought
    pub pnl_pct: Decimal,
}

/// Cash/position bookkeeping owned by exactly one agent.
///
/// Invariants held after every committed trade:
/// - cash is never negative
/// - position quantities are never negative and zero positions are removed
/// - the trade history only grows and its length is the trade count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    cash: Decimal,
    initial_cash: Decimal,
    fee_per_trade: Decimal,
    fees_enabled: bool,
    positions: HashMap<String, Position>,
    trade_history: Vec<Trade>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(dec!(5000), dec!(1), true)
    }
}

impl Ledger {
    /// Create a new ledger with starting cash and a flat per-trade fee.
    pub fn new(initial_cash: Decimal, fee_per_trade: Decimal, fees_enabled: bool) -> Self {
        Self {
            cash: initial_cash,
            initial_cash,
            fee_per_trade,
            fees_enabled,
            positions: HashMap::new(),
            trade_history: Vec::new(),
        }
    }

    /// Available cash.
    pub fn cash(&self) -> Decimal {
        self.cash
    }

    /// Cash the ledger started with.
    pub fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    /// Fee charged on the next trade (0 when fees are disabled).
    pub fn fee(&self) -> Decimal {
        if self.fees_enabled {
            self.fee_per_trade
        } else {
            Decimal::ZERO
        }
    }

    /// Configured per-trade fee, regardless of whether fees are enabled.
    pub fn fee_per_trade(&self) -> Decimal {
        self.fee_per_trade
    }

    /// Whether fees are charged.
    pub fn fees_enabled(&self) -> bool {
        self.fees_enabled
    }

    /// Number of committed trades.
    pub fn trade_count(&self) -> usize {
        self.trade_history.len()
    }

    /// Every committed trade, oldest first.
    pub fn trades(&self) -> &[Trade] {
        &self.trade_history
    }

    /// Open positions by symbol.
    pub fn positions(&self) -> &HashMap<String, Position> {
        &self.positions
    }

    /// Open position in a symbol.
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Held quantity, or 0 when flat.
    pub fn get_position(&self, symbol: &str) -> u64 {
        self.positions.get(symbol).map(|p| p.qty).unwrap_or(0)
    }

    /// Check if we hold a symbol.
    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    /// Buy `qty` shares at `price`.
    ///
    /// Rejected without any mutation when the price is not positive, the
    /// quantity is zero, `price * qty + fee` exceeds cash, or the order
    /// value does not fit in a `Decimal`.
    pub fn buy(&mut self, symbol: &str, price: Decimal, qty: u64) -> Result<Trade, OrderRejected> {
        if price <= Decimal::ZERO {
            return Err(OrderRejected::InvalidPrice(price));
        }
        if qty == 0 {
            return Err(OrderRejected::ZeroQuantity);
        }

        let fee = self.fee();
        let required = price
            .checked_mul(Decimal::from(qty))
            .and_then(|gross| gross.checked_add(fee))
            .ok_or(OrderRejected::Overflow)?;
        if required > self.cash {
            return Err(OrderRejected::InsufficientCash {
                required,
                available: self.cash,
            });
        }

        let position = match self.positions.get(symbol) {
            Some(existing) => {
                let (new_qty, avg_price) =
                    existing.with_lot(qty, price).ok_or(OrderRejected::Overflow)?;
                Position::new(symbol, new_qty, avg_price)
            }
            None => Position::new(symbol, qty, price),
        };

        self.cash -= required;
        self.positions.insert(symbol.to_string(), position);

        Ok(self.record(symbol, Side::Buy, qty, price, fee))
    }

    /// Sell up to `qty` shares at `price`.
    ///
    /// The quantity is clamped to the held quantity. Rejected without any
    /// mutation when the price is not positive, the quantity is zero, the
    /// symbol is not held, the fee would push cash below zero, or the
    /// proceeds do not fit in a `Decimal`.
    pub fn sell(&mut self, symbol: &str, price: Decimal, qty: u64) -> Result<Trade, OrderRejected> {
        if price <= Decimal::ZERO {
            return Err(OrderRejected::InvalidPrice(price));
        }
        if qty == 0 {
            return Err(OrderRejected::ZeroQuantity);
        }

        let held = self.get_position(symbol);
        if held == 0 {
            return Err(OrderRejected::NotHeld(symbol.to_string()));
        }
        let qty = qty.min(held);

        let fee = self.fee();
        let gross = price
            .checked_mul(Decimal::from(qty))
            .ok_or(OrderRejected::Overflow)?;
        let cash_after_gross = self.cash.checked_add(gross).ok_or(OrderRejected::Overflow)?;
        if cash_after_gross < fee {
            return Err(OrderRejected::InsufficientCash {
                required: fee,
                available: cash_after_gross,
            });
        }

        self.cash = cash_after_gross - fee;
        if qty == held {
            self.positions.remove(symbol);
        } else if let Some(position) = self.positions.get_mut(symbol) {
            position.qty -= qty;
        }

        Ok(self.record(symbol, Side::Sell, qty, price, fee))
    }

    fn record(
        &mut self,
        symbol: &str,
        side: Side,
        qty: u64,
        price: Decimal,
        fee: Decimal,
    ) -> Trade {
        let trade = Trade {
            symbol: symbol.to_string(),
            side,
            qty,
            price,
            fee,
        };
        self.trade_history.push(trade.clone());
        trade
    }

    /// Mark-to-market value: cash plus each position at its market price.
    ///
    /// Positions without a positive market price are valued at cost basis
    /// rather than zero.
    pub fn value(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        self.value_with(|symbol| prices.get(symbol).copied())
    }

    /// Mark-to-market value with a custom price lookup.
    ///
    /// Saturates at `Decimal::MAX` instead of overflowing.
    pub fn value_with<F>(&self, price_of: F) -> Decimal
    where
        F: Fn(&str) -> Option<Decimal>,
    {
        self.positions
            .values()
            .fold(self.cash, |total, p| total.saturating_add(p.mark(price_of(&p.symbol))))
    }

    /// Aggregate the trade history per symbol.
    ///
    /// Unrealized P&L is only computed when a price map is given.
    pub fn summarize_by_symbol(
        &self,
        prices: Option<&HashMap<String, Decimal>>,
    ) -> BTreeMap<String, SymbolSummary> {
        let mut summaries: BTreeMap<String, SymbolSummary> = BTreeMap::new();

        for trade in &self.trade_history {
            let summary = summaries.entry(trade.symbol.clone()).or_default();
            match trade.side {
                Side::Buy => {
                    summary.buys += 1;
                    summary.bought_qty += trade.qty;
                    summary.total_cost += trade.gross() + trade.fee;
                }
                Side::Sell => {
                    summary.sells += 1;
                    summary.sold_qty += trade.qty;
                    summary.total_revenue += trade.gross() - trade.fee;
                }
            }
        }

        for (symbol, summary) in summaries.iter_mut() {
            summary.realized_pnl = summary.total_revenue - summary.total_cost;

            let position = self.positions.get(symbol);
            summary.open_qty = position.map(|p| p.qty).unwrap_or(0);

            if let Some(prices) = prices {
                let unrealized = match (position, prices.get(symbol)) {
                    (Some(p), Some(&price)) if price > Decimal::ZERO => p.unrealized_pnl(price),
                    _ => Decimal::ZERO,
                };
                summary.unrealized_pnl = Some(unrealized);
            }

            summary.total_pnl = summary.realized_pnl + summary.unrealized_pnl.unwrap_or_default();
            summary.pnl_pct = if summary.total_cost.is_zero() {
                Decimal::ZERO
            } else {
                summary.total_pnl / summary.total_cost * dec!(100)
            };
        }

        summaries
    }
}
