use super::AnalyzerOutput;
use crate::artifacts::{LinkedArtifact, LocalArtifactHandle};
use crate::metrics::{MetricCatalog, MetricResult};
use crate::store::ResultStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use strum::Display;

const LOG_TARGET: &str = " net score";

/// How metrics that did not succeed count towards the net score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MissingMetricPolicy {
    /// Count the metric as a zero, keeping its weight in the denominator.
    #[default]
    Penalize,

    /// Leave the metric out of the average altogether.
    Ignore,
}

/// The combined score of an artifact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetScore {
    value: f64,
    has_applicable_metrics: bool,
}

impl NetScore {
    #[must_use]
    pub const fn new(value: f64, has_applicable_metrics: bool) -> Self {
        Self {
            value,
            has_applicable_metrics,
        }
    }

    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub const fn has_applicable_metrics(&self) -> bool {
        self.has_applicable_metrics
    }
}

/// Folds metric results into a net score and persists the final output.
#[derive(Debug, Clone)]
pub struct NetScoreCalculator {
    policy: MissingMetricPolicy,
    target_platform: Option<String>,
    store: Arc<dyn ResultStore>,
}

impl NetScoreCalculator {
    /// `target_platform` selects which entry of a breakdown-valued metric is scored;
    /// without one, breakdowns score as the mean of their entries.
    #[must_use]
    pub const fn new(policy: MissingMetricPolicy, target_platform: Option<String>, store: Arc<dyn ResultStore>) -> Self {
        Self {
            policy,
            target_platform,
            store,
        }
    }

    /// Weighted average of the metric values, using the weights from `catalog`.
    #[must_use]
    pub fn calculate(&self, results: &[MetricResult], catalog: &MetricCatalog) -> NetScore {
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for result in results {
            let Some(entry) = catalog.get(result.name()) else {
                log::warn!(target: LOG_TARGET, "Result for unregistered metric '{}' does not count towards the net score", result.name());
                continue;
            };
            let weight = entry.descriptor().weight();

            match result.value() {
                Some(value) if result.is_success() => {
                    numerator += weight * value.score(self.target_platform.as_deref());
                    denominator += weight;
                }
                _ => {
                    if self.policy == MissingMetricPolicy::Penalize {
                        denominator += weight;
                    }
                }
            }
        }

        let value = if denominator > 0.0 {
            (numerator / denominator).clamp(0.0, 1.0)
        } else {
            0.0
        };

        NetScore::new(value, !results.is_empty())
    }

    /// Score `results`, assemble the output for `artifact` and persist it.
    ///
    /// A store failure is logged; the output is returned regardless.
    pub async fn finalize(&self, artifact: &LocalArtifactHandle, results: Vec<MetricResult>, catalog: &MetricCatalog, started: Instant) -> AnalyzerOutput {
        let net_score = self.calculate(&results, catalog);
        let output = AnalyzerOutput::new(artifact.artifact().clone(), results, net_score, started.elapsed(), Utc::now())
            .with_location(artifact.root())
            .with_links(
                artifact.code().map(LinkedArtifact::artifact).cloned(),
                artifact.dataset().map(LinkedArtifact::artifact).cloned(),
            );

        let key = output.artifact().key();
        let store = Arc::clone(&self.store);
        let persisted = output.clone();
        match tokio::task::spawn_blocking(move || store.put_result(&key, &persisted).map_err(|e| (key, e))).await {
            Ok(Ok(())) => {}
            Ok(Err((key, e))) => log::warn!(target: LOG_TARGET, "Could not persist results for '{key}': {e:#}"),
            Err(e) => log::warn!(target: LOG_TARGET, "Persisting results for '{}' failed: {e}", output.artifact()),
        }

        output
    }
}
