use super::readme::Readme;
use crate::artifacts::{ArtifactCategory, LocalArtifactHandle};
use crate::metrics::{Budget, Metric, MetricError, MetricValue};
use futures::future::BoxFuture;

/// Minutes assumed with a README that offers no help beyond existing.
const BASELINE_MINUTES: f64 = 12.0;

/// Documentation features and how many minutes each one saves a newcomer.
const TIME_SAVERS: &[(&[&str], f64)] = &[
    (&["quickstart", "quick start", "how to use", "usage", "getting started"], 4.0),
    (&["example"], 2.5),
    (&["install", "requirements", "setup"], 2.0),
    (&["intended use", "model description", "dataset description", "overview"], 1.5),
    (&["limitation", "bias", "known issues"], 1.0),
];

/// Minutes saved by including runnable code snippets.
const CODE_BLOCK_MINUTES: f64 = 2.5;

/// Scores how quickly someone new can start using the artifact.
///
/// The README is turned into an estimate of minutes needed to get started; one minute or
/// less scores 1 and anything longer scores `1 / minutes`. Without a README there is
/// nothing to estimate from.
#[derive(Debug, Clone, Copy, Default)]
pub struct RampUpTimeMetric;

impl RampUpTimeMetric {
    async fn evaluate_core(artifact: &LocalArtifactHandle) -> Result<MetricValue, MetricError> {
        let readme = Readme::require(artifact).await?;
        Ok(score_minutes(estimate_minutes(&readme)).into())
    }
}

impl Metric for RampUpTimeMetric {
    fn name(&self) -> &'static str {
        "ramp_up_time"
    }

    fn applies(&self, artifact: &LocalArtifactHandle) -> bool {
        matches!(artifact.category(), ArtifactCategory::Model | ArtifactCategory::Dataset)
    }

    fn evaluate<'a>(&'a self, artifact: &'a LocalArtifactHandle, _budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>> {
        Box::pin(Self::evaluate_core(artifact))
    }
}

fn estimate_minutes(readme: &Readme) -> f64 {
    let mut minutes = BASELINE_MINUTES;

    for (keywords, saved) in TIME_SAVERS {
        if readme.has_heading(keywords) || readme.contains_any(keywords) {
            minutes -= saved;
        }
    }

    if readme.body().contains("```") {
        minutes -= CODE_BLOCK_MINUTES;
    }

    minutes.max(0.5)
}

fn score_minutes(minutes: f64) -> f64 {
    if minutes <= 1.0 { 1.0 } else { 1.0 / minutes }
}
