//! Core data types for the strategy arena.

mod decision;
mod ledger;
mod quote;
mod series;
mod trade;

pub use decision::{Action, Decision};
pub use ledger::{Ledger, Position, SymbolSummary};
pub use quote::{Observation, Quote, Snapshot};
pub use series::PriceSeries;
pub use trade::{Side, Trade};
