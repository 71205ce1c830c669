//! Library side of the `landing-to-bronze` command.
//!
//! The binary parses arguments and prints tables; configuration, logging
//! setup and the pipeline itself live here so integration tests can drive
//! a full load against a local directory.

pub mod config;
pub mod logging;
pub mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::{PIPELINE_NAME, PipelineError, RunSummary, run_pipeline};
