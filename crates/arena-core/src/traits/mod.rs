//! Core traits for the strategy arena.

mod agent;
mod indicator;
mod price_source;

pub use agent::{Agent, AgentConfig, DecisionContext};
pub use indicator::Indicator;
pub use price_source::PriceSource;
