//! Logging setup for the arena binary.

mod logging;

pub use logging::{setup_logging, LogGuard};
