use crate::artifacts::{ArtifactCategory, LocalArtifactHandle};
use crate::metrics::metric::run_blocking;
use crate::metrics::{Budget, Metric, MetricError, MetricValue};
use camino::Utf8Path;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use walkdir::WalkDir;

const GIB: u64 = 1024 * 1024 * 1024;

/// Memory available on typical deployment targets.
const PLATFORM_LIMITS: &[(&str, u64)] = &[
    ("raspberry_pi", GIB),
    ("jetson_nano", 4 * GIB),
    ("desktop_pc", 16 * GIB),
    ("aws_server", 64 * GIB),
];

/// How many directory entries to visit between budget checks.
const CHECK_INTERVAL: usize = 256;

/// Scores how comfortably a model's files fit on each deployment platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeMetric;

impl Metric for SizeMetric {
    fn name(&self) -> &'static str {
        "size"
    }

    fn applies(&self, artifact: &LocalArtifactHandle) -> bool {
        artifact.category() == ArtifactCategory::Model
    }

    fn evaluate<'a>(&'a self, artifact: &'a LocalArtifactHandle, budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>> {
        let root = artifact.root().to_owned();
        Box::pin(async move {
            let bytes = run_blocking(budget, move |budget| total_size(&root, budget)).await?;
            Ok(platform_scores(bytes))
        })
    }
}

fn total_size(root: &Utf8Path, budget: Budget) -> Result<u64, MetricError> {
    let mut total = 0u64;
    let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| entry.file_name() != ".git");

    for (index, entry) in walker.enumerate() {
        if index % CHECK_INTERVAL == 0 {
            budget.check()?;
        }

        let entry = entry.map_err(|e| MetricError::Execution(format!("walking '{root}': {e}")))?;
        if entry.file_type().is_file() {
            total = total.saturating_add(entry.metadata().map_err(|e| MetricError::Execution(e.to_string()))?.len());
        }
    }

    Ok(total)
}

#[expect(clippy::cast_precision_loss, reason = "sizes are only compared approximately")]
fn platform_scores(bytes: u64) -> MetricValue {
    MetricValue::Breakdown(
        PLATFORM_LIMITS
            .iter()
            .map(|(platform, limit)| ((*platform).to_string(), (1.0 - bytes as f64 / *limit as f64).max(0.0)))
            .collect::<BTreeMap<_, _>>(),
    )
}
