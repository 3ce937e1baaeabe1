//! Agentic orchestration runtime for the Joule climate assistant.
//!
//! A free-text goal becomes a plan (an ordered tool-name list), the plan
//! becomes a run with its own ordered event stream, and the run ends in
//! exactly one terminal status.  Cancellation is cooperative and only
//! observed at tool boundaries.

mod events;
pub mod planner;
mod runner;

pub use events::{AgentEvent, AgentStatus, StepResult, StepStatus};
pub use runner::{RunManager, RunSubmission};
