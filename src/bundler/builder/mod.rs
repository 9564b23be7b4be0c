//! Build orchestration and coordination.
//!
//! - [`checksum`] - SHA-256 of the finished artifact
//! - [`orchestrator`] - [`Pipeline`], which sequences every build phase
//! - [`tool_detection`] - host tool availability checking

pub mod checksum;
mod orchestrator;
pub mod tool_detection;

pub use orchestrator::{BuildSummary, Pipeline, phase};
