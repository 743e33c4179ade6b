use super::MetricValue;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Terminal state of one metric evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Success,
    Failed,
    TimedOut,
    Skipped,
}

/// The outcome of one metric for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    name: String,
    value: Option<MetricValue>,
    latency: Duration,
    status: MetricStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default)]
    from_cache: bool,
}

impl MetricResult {
    #[must_use]
    pub fn success(name: impl Into<String>, value: MetricValue, latency: Duration) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            latency,
            status: MetricStatus::Success,
            error: None,
            from_cache: false,
        }
    }

    #[must_use]
    pub fn failed(name: impl Into<String>, error: impl Into<String>, latency: Duration) -> Self {
        Self {
            name: name.into(),
            value: None,
            latency,
            status: MetricStatus::Failed,
            error: Some(error.into()),
            from_cache: false,
        }
    }

    #[must_use]
    pub fn timed_out(name: impl Into<String>, latency: Duration) -> Self {
        Self {
            name: name.into(),
            value: None,
            latency,
            status: MetricStatus::TimedOut,
            error: Some(format!("did not finish within {:.3}s", latency.as_secs_f64())),
            from_cache: false,
        }
    }

    #[must_use]
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>, latency: Duration) -> Self {
        Self {
            name: name.into(),
            value: None,
            latency,
            status: MetricStatus::Skipped,
            error: Some(reason.into()),
            from_cache: false,
        }
    }

    /// Mark a stored result as served from the cache.
    #[must_use]
    pub fn into_cached(self) -> Self {
        Self {
            latency: Duration::ZERO,
            from_cache: true,
            ..self
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn value(&self) -> Option<&MetricValue> {
        self.value.as_ref()
    }

    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    #[must_use]
    pub const fn status(&self) -> MetricStatus {
        self.status
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn from_cache(&self) -> bool {
        self.from_cache
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == MetricStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_results_have_no_latency() {
        let result = MetricResult::success("license", MetricValue::Score(1.0), Duration::from_millis(40)).into_cached();
        assert!(result.from_cache());
        assert!(result.is_success());
        assert_eq!(result.latency(), Duration::ZERO);
        assert_eq!(result.value(), Some(&MetricValue::Score(1.0)));
    }

    #[test]
    fn failures_carry_detail() {
        let result = MetricResult::failed("size", "permission denied", Duration::from_millis(3));
        assert_eq!(result.status(), MetricStatus::Failed);
        assert_eq!(result.error(), Some("permission denied"));
        assert!(result.value().is_none());
    }

    #[test]
    fn status_names_are_snake_case() {
        assert_eq!(MetricStatus::TimedOut.to_string(), "timed_out");
        assert_eq!(serde_json::to_string(&MetricStatus::TimedOut).unwrap(), r#""timed_out""#);
    }
}
