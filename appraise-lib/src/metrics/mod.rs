//! The metric contract and the built-in metric catalog.
//!
//! A [`Metric`] is one independently executable scoring heuristic. It is paired with a
//! [`MetricDescriptor`] (name, [`CostClass`], weight) and a timeout in a
//! [`CatalogEntry`]; the entries configured for a run form the [`MetricCatalog`].
//!
//! Each evaluation yields exactly one [`MetricResult`], carrying a [`MetricValue`] on
//! success and a [`MetricStatus`] explaining what happened otherwise.
//!
//! Built-in metrics are registered statically in `metric_def.rs`.

pub mod builtin;
mod catalog;
mod metric;
mod metric_def;
mod metric_descriptor;
mod metric_result;
mod metric_value;

pub use catalog::{CatalogEntry, MetricCatalog};
pub(crate) use metric::error_chain;
pub use metric::{Budget, Metric, MetricError, MetricTarget};
pub use metric_def::{METRIC_DEFINITIONS, MetricDef, find_metric_def};
pub use metric_descriptor::{CostClass, MetricDescriptor};
pub use metric_result::{MetricResult, MetricStatus};
pub use metric_value::MetricValue;
