use super::readme::Readme;
use crate::artifacts::{ArtifactCategory, LinkedArtifact, LocalArtifactHandle};
use crate::metrics::{Budget, Metric, MetricError, MetricValue};
use futures::future::BoxFuture;
use regex::Regex;
use std::sync::LazyLock;

static DATASET_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"huggingface\.co/datasets/|kaggle\.com/datasets/|zenodo\.org/record").expect("invalid regex"));

static CODE_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(github\.com|gitlab\.com|bitbucket\.org)/[\w.-]+/[\w.-]+").expect("invalid regex"));

const DATASET_LINK_SCORE: f64 = 0.3;
const CODE_LINK_SCORE: f64 = 0.3;
const DATASET_DESCRIPTION_SCORE: f64 = 0.2;

const DATASET_DESCRIPTION_MARKERS: &[&str] = &["dataset description", "dataset summary"];

/// Documentation topics, each worth an equal share of [`DOCUMENTATION_SCORE`].
const DOCUMENTATION_MARKERS: &[&[&str]] = &[
    &["dataset", "data description", "training data"],
    &["usage", "how to use", "getting started"],
    &["example", "sample usage"],
    &["requirements", "dependencies", "installation"],
    &["limitations", "constraints", "known issues"],
];

const DOCUMENTATION_SCORE: f64 = 0.2;

/// What is known about a model's dataset and code apart from its own README.
#[derive(Debug, Clone, Copy, Default)]
struct Links {
    dataset: bool,
    code: bool,
    dataset_described: bool,
}

/// Scores whether a model points to the data it was trained on and the code behind it.
///
/// Links given alongside the model count the same as links found in its README, and a
/// linked dataset whose card describes it counts as a dataset description.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetAndCodeMetric;

impl DatasetAndCodeMetric {
    async fn evaluate_core(artifact: &LocalArtifactHandle) -> Result<MetricValue, MetricError> {
        let readme = Readme::require(artifact).await?;

        let dataset_card = match artifact.dataset().and_then(LinkedArtifact::local) {
            Some(dataset) => Readme::load(dataset).await?,
            None => None,
        };

        let links = Links {
            dataset: artifact.dataset().is_some(),
            code: artifact.code().is_some(),
            dataset_described: dataset_card.is_some_and(|card| card.contains_any(DATASET_DESCRIPTION_MARKERS)),
        };

        Ok(score(&readme, links).into())
    }
}

impl Metric for DatasetAndCodeMetric {
    fn name(&self) -> &'static str {
        "dataset_and_code_score"
    }

    fn applies(&self, artifact: &LocalArtifactHandle) -> bool {
        artifact.category() == ArtifactCategory::Model
    }

    fn evaluate<'a>(&'a self, artifact: &'a LocalArtifactHandle, _budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>> {
        Box::pin(Self::evaluate_core(artifact))
    }
}

#[expect(clippy::cast_precision_loss, reason = "the marker table is tiny")]
fn score(readme: &Readme, links: Links) -> f64 {
    let mut score = 0.0;

    if links.dataset || !readme.metadata_strings("datasets").is_empty() || DATASET_LINK.is_match(readme.body()) {
        score += DATASET_LINK_SCORE;
    }

    if links.code || CODE_LINK.is_match(readme.body()) {
        score += CODE_LINK_SCORE;
    }

    if links.dataset_described || readme.contains_any(&["dataset description", "training data", "trained on"]) {
        score += DATASET_DESCRIPTION_SCORE;
    }

    let documented = DOCUMENTATION_MARKERS.iter().filter(|markers| readme.contains_any(markers)).count();
    score += DOCUMENTATION_SCORE * documented as f64 / DOCUMENTATION_MARKERS.len() as f64;

    score.min(1.0)
}
