//! Pipeline orchestration module.

mod feedback;
mod orchestrator;
mod stats;

pub use feedback::{LogDiagnostics, LogErrorChannel, LogRenderer};
pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
