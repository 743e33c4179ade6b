use super::builtin::{
    BusFactorMetric, CodeQualityMetric, DatasetAndCodeMetric, DatasetQualityMetric, LicenseMetric, PerformanceClaimsMetric, RampUpTimeMetric, SizeMetric,
};
use super::{CostClass, Metric};
use std::sync::Arc;

/// Registration data for a built-in metric.
#[derive(Debug)]
pub struct MetricDef {
    pub name: &'static str,
    pub description: &'static str,
    pub cost_class: CostClass,
    pub default_weight: f64,
    pub factory: fn() -> Arc<dyn Metric>,
}

macro_rules! metric_def {
    ($name:expr, $description:expr, $cost:ident, $weight:expr, $metric:expr) => {
        MetricDef {
            name: $name,
            description: $description,
            cost_class: CostClass::$cost,
            default_weight: $weight,
            factory: || -> Arc<dyn Metric> { Arc::new($metric) },
        }
    };
}

pub const METRIC_DEFINITIONS: &[MetricDef] = &[
    metric_def!(
        "bus_factor",
        "How many contributors would have to leave before the project stalls",
        Medium,
        0.15,
        BusFactorMetric
    ),
    metric_def!(
        "code_quality",
        "Tests, CI, lint configuration and comment density of the source files",
        Medium,
        0.15,
        CodeQualityMetric
    ),
    metric_def!(
        "dataset_and_code_score",
        "Whether the training data and code are linked and documented",
        Low,
        0.10,
        DatasetAndCodeMetric
    ),
    metric_def!(
        "dataset_quality",
        "How thoroughly the dataset card documents the data",
        Low,
        0.05,
        DatasetQualityMetric
    ),
    metric_def!(
        "license",
        "Whether the license is compatible with LGPL-2.1",
        Low,
        0.20,
        LicenseMetric
    ),
    metric_def!(
        "performance_claims",
        "Evidence backing the performance claims made in the documentation",
        Low,
        0.10,
        PerformanceClaimsMetric
    ),
    metric_def!(
        "ramp_up_time",
        "How quickly a newcomer can start using the artifact",
        Low,
        0.15,
        RampUpTimeMetric
    ),
    metric_def!(
        "size",
        "How well the artifact fits on common deployment hardware",
        High,
        0.10,
        SizeMetric
    ),
];

/// Look up a built-in metric by name.
#[must_use]
pub fn find_metric_def(name: &str) -> Option<&'static MetricDef> {
    METRIC_DEFINITIONS.iter().find(|def| def.name == name)
}
