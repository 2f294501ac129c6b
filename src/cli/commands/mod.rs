//! CLI command implementations.

pub mod agents;
pub mod run;
pub mod validate;
