use super::metric_def::METRIC_DEFINITIONS;
use super::{Metric, MetricDescriptor};
use crate::pipeline::ConfigError;
use core::time::Duration;
use std::collections::HashSet;
use std::sync::Arc;

/// A metric together with how it is weighted and how long it may run.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    metric: Arc<dyn Metric>,
    descriptor: MetricDescriptor,
    timeout: Duration,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(metric: Arc<dyn Metric>, descriptor: MetricDescriptor, timeout: Duration) -> Self {
        Self {
            metric,
            descriptor,
            timeout,
        }
    }

    #[must_use]
    pub const fn metric(&self) -> &Arc<dyn Metric> {
        &self.metric
    }

    #[must_use]
    pub const fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// The set of metrics registered for a run, ordered by name.
///
/// The catalog is built once from configuration and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct MetricCatalog {
    entries: Vec<CatalogEntry>,
}

impl MetricCatalog {
    /// Build a catalog, rejecting duplicate names, bad weights and zero timeouts.
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self, ConfigError> {
        let mut entries: Vec<_> = entries.into_iter().collect();
        let mut seen = HashSet::new();

        for entry in &entries {
            let name = entry.name();

            if entry.metric.name() != name {
                return Err(ConfigError::NameMismatch {
                    configured: name.to_string(),
                    reported: entry.metric.name().to_string(),
                });
            }

            if !seen.insert(name) {
                return Err(ConfigError::DuplicateMetric(name.to_string()));
            }

            let weight = entry.descriptor.weight();
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    name: name.to_string(),
                    weight,
                });
            }

            if entry.timeout.is_zero() {
                return Err(ConfigError::ZeroTimeout(format!("metric '{name}'")));
            }
        }

        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(Self { entries })
    }

    /// Every built-in metric with its default weight and cost class.
    #[must_use]
    pub fn builtin(timeout: Duration) -> Self {
        let mut entries: Vec<_> = METRIC_DEFINITIONS
            .iter()
            .map(|def| CatalogEntry::new((def.factory)(), MetricDescriptor::new(def.name, def.cost_class, def.default_weight), timeout))
            .collect();
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries
            .binary_search_by(|entry| entry.name().cmp(name))
            .ok()
            .and_then(|index| self.entries.get(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
