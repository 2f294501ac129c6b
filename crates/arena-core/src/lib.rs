//! Core types and traits for the strategy arena.
//!
//! This crate provides the foundational building blocks including:
//! - Price observations (Quote, Observation, Snapshot, PriceSeries)
//! - The per-agent ledger with its trade history
//! - Agent decisions
//! - Core traits for agents, indicators and price sources

pub mod types;
pub mod traits;
pub mod error;

pub use error::{AgentError, ArenaError, ArenaResult, DataError, OrderRejected, SimulationError};
pub use types::*;
pub use traits::*;
