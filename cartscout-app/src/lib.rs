//! Orchestration for the `cartscout` binary.
pub mod pipeline;
pub mod prompt;

pub use pipeline::{Pipeline, RunOutcome};
