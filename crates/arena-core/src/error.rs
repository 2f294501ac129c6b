//! Error types for the strategy arena.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level arena error.
#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Reasons a ledger refuses a buy or sell.
///
/// A rejection is a normal outcome of trading, not a failure of the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderRejected {
    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    #[error("Quantity must be greater than 0")]
    ZeroQuantity,

    #[error("Insufficient cash: required {required}, available {available}")]
    InsufficientCash { required: Decimal, available: Decimal },

    #[error("No position held in {0}")]
    NotHeld(String),

    #[error("Order value overflows")]
    Overflow,
}

/// Agent-specific errors.
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Agent kind not found: {0}")]
    NotFound(String),

    #[error("Decision failed: {0}")]
    DecisionFailed(String),

    #[error("Agent panicked: {0}")]
    Panicked(String),
}

/// Price source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available")]
    NoDataAvailable,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Errors raised while assembling a simulation.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Duplicate agent name: {0}")]
    DuplicateAgent(String),

    #[error("No agents registered")]
    NoAgents,

    #[error("No symbols configured")]
    NoSymbols,
}

/// Result type alias for arena operations.
pub type ArenaResult<T> = Result<T, ArenaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn load() -> ArenaResult<()> {
        let parsed: Result<(), DataError> = Err(DataError::ParseError("bad row".into()));
        parsed?;
        Ok(())
    }

    #[test]
    fn test_conversions() {
        let err = load().unwrap_err();
        assert!(matches!(err, ArenaError::Data(DataError::ParseError(_))));
        assert_eq!(err.to_string(), "Data error: Parse error: bad row");

        let err: ArenaError = SimulationError::DuplicateAgent("a".into()).into();
        assert_eq!(err.to_string(), "Simulation error: Duplicate agent name: a");
    }

    #[test]
    fn test_rejection_message() {
        let err = OrderRejected::InsufficientCash {
            required: dec!(101),
            available: dec!(50),
        };
        assert!(err.to_string().contains("101"));
    }
}
