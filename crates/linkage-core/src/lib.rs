//! Contact linkage pipeline.
//!
//! Ties the matching stages and clustering together behind [`plan`] and
//! [`run`]. Logging goes through `tracing`; installing a subscriber is left to
//! the caller.

pub mod error;
pub mod pipeline;

pub use error::{ErrorCategory, PipelineError, Result};
pub use pipeline::{
    RunOutcome, RunPlan, RunReport, StrategyPlan, StrategyReport, plan, run,
};
