use super::readme::Readme;
use crate::artifacts::{ArtifactCategory, LocalArtifactHandle};
use crate::metrics::{Budget, Metric, MetricError, MetricTarget, MetricValue};
use futures::future::BoxFuture;

/// Topics a dataset card is expected to cover, each worth an equal share of the score.
const CARD_TOPICS: &[&[&str]] = &[
    &["dataset description", "dataset summary"],
    &["dataset structure", "data fields", "data splits", "data instances"],
    &["source data", "data collection", "curation"],
    &["limitations", "bias", "considerations"],
    &["citation", "licensing information"],
];

/// Scores how thoroughly a dataset card documents the data.
///
/// Runs against a model's linked dataset, or against a dataset evaluated on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetQualityMetric;

impl DatasetQualityMetric {
    async fn evaluate_core(artifact: &LocalArtifactHandle) -> Result<MetricValue, MetricError> {
        let card = Readme::require(artifact).await?;
        Ok(score_card(&card).into())
    }
}

impl Metric for DatasetQualityMetric {
    fn name(&self) -> &'static str {
        "dataset_quality"
    }

    fn target(&self) -> MetricTarget {
        MetricTarget::Dataset
    }

    fn applies(&self, artifact: &LocalArtifactHandle) -> bool {
        artifact.category() == ArtifactCategory::Dataset
    }

    fn evaluate<'a>(&'a self, artifact: &'a LocalArtifactHandle, _budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>> {
        Box::pin(Self::evaluate_core(artifact))
    }
}

#[expect(clippy::cast_precision_loss, reason = "the topic table is tiny")]
fn score_card(card: &Readme) -> f64 {
    let covered = CARD_TOPICS
        .iter()
        .filter(|topics| card.has_heading(topics) || card.contains_any(topics))
        .count();
    covered as f64 / CARD_TOPICS.len() as f64
}
