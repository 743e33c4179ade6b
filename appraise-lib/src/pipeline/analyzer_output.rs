use super::NetScore;
use crate::artifacts::ArtifactRef;
use crate::metrics::MetricResult;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Everything known about one evaluated artifact.
///
/// This is the unit handed to the result store and to reporting. Results are kept
/// sorted by metric name, one per staged metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerOutput {
    artifact: ArtifactRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Utf8PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dataset: Option<ArtifactRef>,
    results: Vec<MetricResult>,
    net_score: f64,
    has_applicable_metrics: bool,
    total_latency: Duration,
    evaluated_at: DateTime<Utc>,
}

impl AnalyzerOutput {
    #[must_use]
    pub fn new(
        artifact: ArtifactRef,
        mut results: Vec<MetricResult>,
        net_score: NetScore,
        total_latency: Duration,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        results.sort_by(|a, b| a.name().cmp(b.name()));

        Self {
            artifact,
            location: None,
            code: None,
            dataset: None,
            results,
            net_score: net_score.value(),
            has_applicable_metrics: net_score.has_applicable_metrics(),
            total_latency,
            evaluated_at,
        }
    }

    /// Record the directory the artifact was resolved to.
    #[must_use]
    pub fn with_location(self, location: impl Into<Utf8PathBuf>) -> Self {
        Self {
            location: Some(location.into()),
            ..self
        }
    }

    /// Record the code and dataset the artifact was evaluated together with.
    #[must_use]
    pub fn with_links(self, code: Option<ArtifactRef>, dataset: Option<ArtifactRef>) -> Self {
        Self { code, dataset, ..self }
    }

    #[must_use]
    pub const fn artifact(&self) -> &ArtifactRef {
        &self.artifact
    }

    /// Where the artifact's files were found.
    #[must_use]
    pub fn location(&self) -> Option<&Utf8Path> {
        self.location.as_deref()
    }

    #[must_use]
    pub const fn code(&self) -> Option<&ArtifactRef> {
        self.code.as_ref()
    }

    #[must_use]
    pub const fn dataset(&self) -> Option<&ArtifactRef> {
        self.dataset.as_ref()
    }

    #[must_use]
    pub fn results(&self) -> &[MetricResult] {
        &self.results
    }

    /// The result of a single metric, if it was staged.
    #[must_use]
    pub fn result(&self, name: &str) -> Option<&MetricResult> {
        self.results
            .binary_search_by(|r| r.name().cmp(name))
            .ok()
            .map(|index| &self.results[index])
    }

    #[must_use]
    pub const fn net_score(&self) -> f64 {
        self.net_score
    }

    /// Whether any metric applied to the artifact. A net score of zero with no applicable
    /// metrics means "nothing to say", not "bad".
    #[must_use]
    pub const fn has_applicable_metrics(&self) -> bool {
        self.has_applicable_metrics
    }

    /// Wall-clock time of the whole evaluation, from resolution to scoring.
    #[must_use]
    pub const fn total_latency(&self) -> Duration {
        self.total_latency
    }

    #[must_use]
    pub const fn evaluated_at(&self) -> DateTime<Utc> {
        self.evaluated_at
    }
}
