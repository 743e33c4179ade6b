use crate::artifacts::{ArtifactCategory, LocalArtifactHandle, git};
use crate::metrics::{Budget, Metric, MetricError, MetricTarget, MetricValue};
use futures::future::BoxFuture;

/// Scores how widely commit authorship is spread across contributors.
///
/// `k` is the smallest number of top contributors who together authored at least half
/// of all commits. One dominant contributor scores 0; otherwise the score is `2k / n`
/// for `n` contributors, capped at 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusFactorMetric;

impl BusFactorMetric {
    async fn evaluate_core(artifact: &LocalArtifactHandle, budget: Budget) -> Result<MetricValue, MetricError> {
        let counts = git::commits_by_author(artifact.root(), budget.remaining()).await?;
        Ok(bus_factor(counts.into_values().collect()).into())
    }
}

impl Metric for BusFactorMetric {
    fn name(&self) -> &'static str {
        "bus_factor"
    }

    fn target(&self) -> MetricTarget {
        MetricTarget::Code
    }

    fn applies(&self, artifact: &LocalArtifactHandle) -> bool {
        artifact.category() == ArtifactCategory::Code && artifact.has_git_history()
    }

    fn evaluate<'a>(&'a self, artifact: &'a LocalArtifactHandle, budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>> {
        Box::pin(Self::evaluate_core(artifact, budget))
    }
}

#[expect(clippy::cast_precision_loss, reason = "contributor counts are small")]
fn bus_factor(mut commit_counts: Vec<u64>) -> f64 {
    let total: u64 = commit_counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    commit_counts.sort_unstable_by(|a, b| b.cmp(a));

    let mut covered = 0;
    let mut k = 0usize;
    for count in &commit_counts {
        covered += count;
        k += 1;
        if covered * 2 >= total {
            break;
        }
    }

    if k <= 1 {
        return 0.0;
    }

    (2.0 * k as f64 / commit_counts.len() as f64).min(1.0)
}
