use super::{ConfigError, InvalidInput, PriorityFunction};
use crate::artifacts::{ArtifactCategory, ArtifactRef, LocalArtifactHandle};
use crate::metrics::{CatalogEntry, Metric, MetricCatalog, MetricDescriptor, MetricTarget};
use core::time::Duration;
use std::sync::Arc;

const LOG_TARGET: &str = "    stager";

/// A metric selected for an artifact, with the priority it was scheduled by.
///
/// The subject is the artifact the metric runs against: the evaluated artifact itself,
/// or the code or dataset linked to it. A linked subject without local files has no
/// handle and can only be served from stored results.
#[derive(Debug, Clone)]
pub struct StagedMetric {
    entry: CatalogEntry,
    priority: f64,
    subject: ArtifactRef,
    subject_handle: Option<Arc<LocalArtifactHandle>>,
}

impl StagedMetric {
    #[must_use]
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    #[must_use]
    pub const fn priority(&self) -> f64 {
        self.priority
    }

    #[must_use]
    pub const fn metric(&self) -> &Arc<dyn Metric> {
        self.entry.metric()
    }

    #[must_use]
    pub const fn descriptor(&self) -> &MetricDescriptor {
        self.entry.descriptor()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.entry.timeout()
    }

    #[must_use]
    pub const fn subject(&self) -> &ArtifactRef {
        &self.subject
    }

    #[must_use]
    pub const fn subject_handle(&self) -> Option<&Arc<LocalArtifactHandle>> {
        self.subject_handle.as_ref()
    }
}

/// Decides which metrics apply to an artifact and in which order they are submitted.
///
/// Metrics are ordered by descending priority weight, derived from their cost class
/// through the configured [`PriorityFunction`]; equal weights fall back to name order.
/// Staging only calls the metrics' cheap `applies` gates. Metrics targeting a linked
/// artifact without local files are staged ungated.
#[derive(Debug, Clone, Copy)]
pub struct MetricStager {
    priority_function: PriorityFunction,
}

impl MetricStager {
    pub fn new(priority_function: PriorityFunction) -> Result<Self, ConfigError> {
        priority_function.validate()?;
        Ok(Self { priority_function })
    }

    pub fn stage(&self, artifact: &Arc<LocalArtifactHandle>, catalog: &MetricCatalog) -> Result<Vec<StagedMetric>, InvalidInput> {
        let mut staged = Vec::with_capacity(catalog.len());

        for entry in catalog.entries() {
            let Some((subject, subject_handle)) = subject_of(artifact, entry.metric().target()) else {
                log::trace!(target: LOG_TARGET, "'{}' has no {} to run against for '{}'", entry.name(), entry.metric().target(), artifact.artifact());
                continue;
            };

            if let Some(handle) = &subject_handle
                && !entry.metric().applies(handle)
            {
                log::trace!(target: LOG_TARGET, "'{}' does not apply to '{subject}'", entry.name());
                continue;
            }

            let priority = self.priority_function.weight(entry.descriptor().cost_class().priority_input())?;
            staged.push(StagedMetric {
                entry: entry.clone(),
                priority,
                subject,
                subject_handle,
            });
        }

        staged.sort_by(|a, b| b.priority.total_cmp(&a.priority).then_with(|| a.name().cmp(b.name())));
        Ok(staged)
    }
}

fn subject_of(artifact: &Arc<LocalArtifactHandle>, target: MetricTarget) -> Option<(ArtifactRef, Option<Arc<LocalArtifactHandle>>)> {
    let linked = match target {
        MetricTarget::Code if artifact.category() != ArtifactCategory::Code => artifact.code(),
        MetricTarget::Dataset if artifact.category() != ArtifactCategory::Dataset => artifact.dataset(),
        _ => return Some((artifact.artifact().clone(), Some(Arc::clone(artifact)))),
    }?;

    Some((linked.artifact().clone(), linked.local().cloned()))
}
