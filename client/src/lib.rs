//! Companion client for the items service.
//!
//! Executes the I/O-free requests built by `items_core::ItemClient` over
//! blocking HTTP and drives a fixed sequence of calls, reporting each
//! outcome. Analysis results can optionally be persisted.

pub mod analysis_log;
pub mod cli;
pub mod sequence;
pub mod transport;

pub use analysis_log::{AnalysisLog, AnalysisLogEntry};
pub use cli::ClientArgs;
pub use sequence::{AnalysisSink, Outcome, Plan, Runner, StepReport};
pub use transport::Transport;
