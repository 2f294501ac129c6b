//! Trade records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// An executed trade. Immutable once appended to a ledger's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Symbol traded
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Shares filled (after any sell clamping)
    pub qty: u64,
    /// Fill price per share
    pub price: Decimal,
    /// Fee charged for the trade
    pub fee: Decimal,
}

impl Trade {
    /// Gross value of the fill (qty * price).
    pub fn gross(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }

    /// Net cash impact: negative for buys, positive for sells.
    pub fn cash_flow(&self) -> Decimal {
        match self.side {
            Side::Buy => -(self.gross() + self.fee),
            Side::Sell => self.gross() - self.fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cash_flow() {
        let buy = Trade {
            symbol: "AAPL".into(),
            side: Side::Buy,
            qty: 2,
            price: dec!(100),
            fee: dec!(1),
        };
        assert_eq!(buy.gross(), dec!(200));
        assert_eq!(buy.cash_flow(), dec!(-201));

        let sell = Trade {
            side: Side::Sell,
            ..buy
        };
        assert_eq!(sell.cash_flow(), dec!(199));
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }
}
