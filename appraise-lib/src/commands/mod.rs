//! Command-line interface and orchestration for appraise
//!
//! This module implements the CLI commands and wires the pipeline's collaborators
//! together: configuration, artifact resolution, the result store, progress
//! reporting and record output.
//!
//! # Commands
//!
//! - **evaluate**: Resolve artifacts, run the configured metrics on each, and print one
//!   flat JSON record per artifact
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file and describe what it would run
//!
//! The `run` function parses command-line arguments using clap and routes to the
//! appropriate command handler. All output goes through a [`Host`] so that commands
//! can be exercised in tests without touching the process.

mod common;
mod config;
mod evaluate;
mod host;
mod init;
mod progress_reporter;
mod run;
mod validate;

#[cfg(debug_assertions)]
pub use config::{Config, MetricConfig};

pub use evaluate::{EvaluateArgs, evaluate_artifacts};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use run::run;
pub use validate::{ValidateArgs, validate_config};
