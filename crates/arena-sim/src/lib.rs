//! Multi-agent simulation driver.
//!
//! Replays a price source through every registered agent, each with its own
//! ledger, and produces comparable telemetry.

mod engine;
mod metrics;
mod report;

pub use engine::{
    AgentSlot, Simulation, SimulationConfig, StepOutcome, StopHandle, StopReason, TradeEvent,
};
pub use metrics::{evaluate, rank, CurveStats, Evaluation, Standing};
pub use report::{AgentReport, LedgerState, RunReport};
