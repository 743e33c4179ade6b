use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Rough expected cost of evaluating a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CostClass {
    /// Reads a few small files.
    Low,

    /// Walks a tree or runs an external tool.
    Medium,

    /// Touches every byte of a potentially large artifact.
    High,
}

impl CostClass {
    /// The input fed to a priority function for this cost class.
    #[must_use]
    pub const fn priority_input(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 2.0,
            Self::High => 4.0,
        }
    }
}

/// Static registration data for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    name: String,
    cost_class: CostClass,
    weight: f64,
}

impl MetricDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, cost_class: CostClass, weight: f64) -> Self {
        Self {
            name: name.into(),
            cost_class,
            weight,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn cost_class(&self) -> CostClass {
        self.cost_class
    }

    /// Contribution of this metric to the net score.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }
}
