//! The metric evaluation pipeline.
//!
//! An artifact is resolved to a local handle, the applicable metrics are staged in
//! priority order, run concurrently on a bounded worker pool, and their results are
//! folded into a single net score. [`Pipeline`] ties the stages together.
//!
//! Models can be evaluated together with their code and dataset; metrics that target
//! those run against the linked artifacts.

mod analyzer_output;
mod config_error;
mod dataset_inference;
mod evaluator;
mod net_score;
mod priority;
mod progress;
mod runner;
mod settings;
mod stager;
mod worker_pool;

pub use analyzer_output::AnalyzerOutput;
pub use config_error::ConfigError;
pub use evaluator::{EvaluationError, Pipeline};
pub use net_score::{MissingMetricPolicy, NetScore, NetScoreCalculator};
pub use priority::{InvalidInput, PriorityFunction};
pub use progress::{NullProgress, Progress};
pub use runner::MetricRunner;
pub use settings::PipelineSettings;
pub use stager::{MetricStager, StagedMetric};
pub use worker_pool::WorkerPool;
