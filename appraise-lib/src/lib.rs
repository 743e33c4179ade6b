#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for appraise
//!
//! This library scores machine-learning models, datasets and code repositories with a
//! catalog of independent metrics and folds the results into a single net score.
//!
//! # Module Organization
//!
//! - [`artifacts`]: Artifact references and their resolution to local files
//! - [`metrics`]: The metric contract and the built-in metrics
//! - [`pipeline`]: Staging, concurrent execution and net scoring
//! - [`store`]: Caching and persistence of results
//! - `commands`: Command-line interface and orchestration
//! - `reports`: Flat record output

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod artifacts;
pub mod metrics;
pub mod pipeline;
pub mod store;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

pub use crate::commands::{Host, run};
