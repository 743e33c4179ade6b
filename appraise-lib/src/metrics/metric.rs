use super::MetricValue;
use crate::artifacts::LocalArtifactHandle;
use crate::artifacts::git::GitError;
use core::fmt::Debug;
use core::time::Duration;
use futures::future::BoxFuture;
use std::time::Instant;

/// A single, independently executable scoring heuristic.
///
/// Implementations must be deterministic: evaluating the same artifact twice yields the
/// same value. `applies` is a cheap gate used during staging and must not perform any
/// slow I/O. `evaluate` may be slow but is expected to watch its [`Budget`] and give
/// up with [`MetricError::BudgetExhausted`] once it runs out.
pub trait Metric: Send + Sync + Debug {
    /// Stable, unique name of the metric.
    fn name(&self) -> &'static str;

    /// Which artifact the metric is evaluated against.
    fn target(&self) -> MetricTarget {
        MetricTarget::Artifact
    }

    /// Whether the metric has anything to say about this artifact.
    fn applies(&self, artifact: &LocalArtifactHandle) -> bool;

    /// Compute the metric's value for the artifact.
    fn evaluate<'a>(&'a self, artifact: &'a LocalArtifactHandle, budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>>;
}

/// The artifact a metric looks at when a model is evaluated together with its links.
///
/// For an artifact of the targeted category itself, the artifact is its own target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MetricTarget {
    /// The artifact being evaluated.
    #[default]
    Artifact,

    /// The code repository behind the artifact.
    Code,

    /// The dataset behind the artifact.
    Dataset,
}

/// Errors a metric reports back to the runner.
///
/// None of these abort an evaluation run; the runner records them on the metric's result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricError {
    /// The computation failed.
    #[error("{0}")]
    Execution(String),

    /// The metric noticed it ran out of time and stopped.
    #[error("evaluation budget exhausted")]
    BudgetExhausted,

    /// The input the metric needs turned out to be missing.
    #[error("{0}")]
    Unavailable(String),
}

impl From<GitError> for MetricError {
    fn from(e: GitError) -> Self {
        match e {
            GitError::TimedOut { .. } => Self::BudgetExhausted,
            e => Self::Execution(error_chain(&e)),
        }
    }
}

impl From<std::io::Error> for MetricError {
    fn from(e: std::io::Error) -> Self {
        Self::Execution(e.to_string())
    }
}

/// An error's message followed by the messages of its sources, separated by `: `.
pub(crate) fn error_chain(e: &dyn core::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// The time a metric has to finish its evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    deadline: Instant,
}

impl Budget {
    #[must_use]
    pub fn new(allowance: Duration) -> Self {
        let now = Instant::now();
        Self {
            deadline: now.checked_add(allowance).unwrap_or(now + Duration::from_hours(24 * 365)),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Bail out of a long computation once the budget is gone.
    pub fn check(&self) -> Result<(), MetricError> {
        if self.is_exhausted() {
            Err(MetricError::BudgetExhausted)
        } else {
            Ok(())
        }
    }
}

/// Run CPU or blocking filesystem work off the async workers.
///
/// The closure receives the budget so it can stop early on its own.
pub(crate) async fn run_blocking<T, F>(budget: Budget, work: F) -> Result<T, MetricError>
where
    T: Send + 'static,
    F: FnOnce(Budget) -> Result<T, MetricError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || work(budget))
        .await
        .map_err(|e| MetricError::Execution(format!("blocking task failed: {e}")))?
}
