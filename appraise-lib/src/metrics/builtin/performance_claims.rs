use super::readme::Readme;
use crate::artifacts::{ArtifactCategory, LocalArtifactHandle};
use crate::metrics::{Budget, Metric, MetricError, MetricValue};
use futures::future::BoxFuture;
use regex::Regex;
use std::sync::LazyLock;

static BENCHMARKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(benchmarks?|glue|superglue|squad|imagenet|mmlu|hellaswag|leaderboard|evaluation results)\b").expect("invalid regex")
});

static NUMERICAL_RESULTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(\.\d+)?\s*%|\b(accuracy|f1|bleu|rouge(-\w+)?|perplexity|precision|recall|exact match|wer)\b[^\n]{0,40}?\d")
        .expect("invalid regex")
});

static ACADEMIC_REFERENCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"arxiv\.org|\bdoi\b|@(article|inproceedings|misc)\s*\{|\bcitation\b").expect("invalid regex"));

static COMPARISONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(outperforms?|state[- ]of[- ]the[- ]art|sota|compared (to|with)|better than|baselines?)\b").expect("invalid regex")
});

/// Kinds of evidence and the share of the score each is worth.
static EVIDENCE: &[(&LazyLock<Regex>, f64)] = &[
    (&BENCHMARKS, 0.4),
    (&NUMERICAL_RESULTS, 0.3),
    (&ACADEMIC_REFERENCES, 0.2),
    (&COMPARISONS, 0.1),
];

/// Scores how well a model card backs up its performance claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceClaimsMetric;

impl PerformanceClaimsMetric {
    async fn evaluate_core(artifact: &LocalArtifactHandle) -> Result<MetricValue, MetricError> {
        Ok(score_readme(&Readme::require(artifact).await?).into())
    }
}

impl Metric for PerformanceClaimsMetric {
    fn name(&self) -> &'static str {
        "performance_claims"
    }

    fn applies(&self, artifact: &LocalArtifactHandle) -> bool {
        artifact.category() == ArtifactCategory::Model
    }

    fn evaluate<'a>(&'a self, artifact: &'a LocalArtifactHandle, _budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>> {
        Box::pin(Self::evaluate_core(artifact))
    }
}

fn score_readme(readme: &Readme) -> f64 {
    let mut score: f64 = EVIDENCE
        .iter()
        .filter(|(pattern, _)| pattern.is_match(readme.body()))
        .map(|(_, weight)| weight)
        .sum();

    // structured evaluation results in the model card count as benchmarks with numbers
    if readme.has_metadata("model-index") && !BENCHMARKS.is_match(readme.body()) {
        score += 0.4;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_evidence() {
        let readme = Readme::parse(
            "## Evaluation results\nOn GLUE we reach 84.6% accuracy, which outperforms the baseline.\n\
             ## Citation\nhttps://arxiv.org/abs/1810.04805\n",
        );
        assert!((score_readme(&readme) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn numbers_only() {
        let readme = Readme::parse("Accuracy: 0.91\n");
        assert!((score_readme(&readme) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn model_index_counts_as_benchmark() {
        let readme = Readme::parse("---\nmodel-index:\n- name: x\n---\n# Model\n");
        assert!((score_readme(&readme) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn no_claims() {
        let readme = Readme::parse("# Model\nA model.\n");
        assert!(score_readme(&readme).abs() < f64::EPSILON);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn missing_readme_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let root = camino::Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let artifact = LocalArtifactHandle::new(crate::artifacts::ArtifactRef::local(&root, ArtifactCategory::Model), &root);

        let outcome = PerformanceClaimsMetric.evaluate(&artifact, Budget::new(core::time::Duration::from_secs(5))).await;
        assert!(matches!(outcome, Err(MetricError::Unavailable(ref reason)) if reason.starts_with("no README")));
    }
}
