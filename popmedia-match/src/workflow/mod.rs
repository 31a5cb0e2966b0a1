//! Batch reconciliation workflow
//!
//! One pass per run: enumerate → plan → execute → tally. The report is
//! written by the caller from the returned [`RunOutput`].

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineConfig, RunOutput};
