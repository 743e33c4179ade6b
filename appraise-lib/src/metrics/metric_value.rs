use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The value produced by a metric.
///
/// Every number is a score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Score(f64),

    /// Sub-scores keyed by name, such as one score per deployment platform.
    Breakdown(BTreeMap<String, f64>),
}

impl MetricValue {
    /// Reduce the value to a single score.
    ///
    /// A breakdown uses its `target` entry when present and the mean of all entries
    /// otherwise. An empty breakdown scores 0.
    #[must_use]
    pub fn score(&self, target: Option<&str>) -> f64 {
        match self {
            Self::Score(score) => *score,
            Self::Breakdown(parts) => {
                if let Some(score) = target.and_then(|t| parts.get(t)) {
                    return *score;
                }

                if parts.is_empty() {
                    0.0
                } else {
                    #[expect(clippy::cast_precision_loss, reason = "breakdowns have a handful of entries")]
                    let len = parts.len() as f64;
                    parts.values().sum::<f64>() / len
                }
            }
        }
    }

    /// Whether every number is a finite score in `[0, 1]`.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        let valid = |v: &f64| v.is_finite() && (0.0..=1.0).contains(v);
        match self {
            Self::Score(score) => valid(score),
            Self::Breakdown(parts) => parts.values().all(valid),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(score: f64) -> Self {
        Self::Score(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown() -> MetricValue {
        MetricValue::Breakdown(BTreeMap::from([("desktop_pc".to_string(), 0.9), ("raspberry_pi".to_string(), 0.1)]))
    }

    #[test]
    fn breakdown_prefers_target_entry() {
        assert!((breakdown().score(Some("raspberry_pi")) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn breakdown_falls_back_to_mean() {
        assert!((breakdown().score(None) - 0.5).abs() < 1e-9);
        assert!((breakdown().score(Some("unknown")) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_breakdown_scores_zero() {
        assert!(MetricValue::Breakdown(BTreeMap::new()).score(None).abs() < f64::EPSILON);
    }

    #[test]
    fn range_check() {
        assert!(MetricValue::Score(0.0).is_in_range());
        assert!(MetricValue::Score(1.0).is_in_range());
        assert!(!MetricValue::Score(1.5).is_in_range());
        assert!(!MetricValue::Score(f64::NAN).is_in_range());
        assert!(breakdown().is_in_range());
    }

    #[test]
    fn serializes_flat() {
        assert_eq!(serde_json::to_string(&MetricValue::Score(0.5)).unwrap(), "0.5");
        assert_eq!(serde_json::to_string(&breakdown()).unwrap(), r#"{"desktop_pc":0.9,"raspberry_pi":0.1}"#);
        let parsed: MetricValue = serde_json::from_str(r#"{"a":1.0}"#).unwrap();
        assert!(matches!(parsed, MetricValue::Breakdown(_)));
    }
}
