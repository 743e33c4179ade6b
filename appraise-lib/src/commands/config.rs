use crate::Result;
use crate::metrics::{CatalogEntry, CostClass, METRIC_DEFINITIONS, MetricCatalog, MetricDescriptor, find_metric_def};
use crate::pipeline::{ConfigError, MissingMetricPolicy, PipelineSettings, PriorityFunction};
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

const LOG_TARGET: &str = "    config";

/// Name of the configuration file looked up when none is given explicitly.
pub const CONFIG_FILE_NAME: &str = "appraise.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Number of metric evaluations allowed in flight at once
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Time a metric may take unless it has its own timeout
    #[serde(default = "default_metric_timeout", with = "humantime_serde")]
    pub metric_timeout: Duration,

    /// Duration to reuse stored metric results before evaluating again
    #[serde(default = "default_cache_ttl", with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// Time allowed for cloning a missing code repository
    #[serde(default = "default_clone_timeout", with = "humantime_serde")]
    pub clone_timeout: Duration,

    /// How metrics without a successful result count towards the net score
    #[serde(default)]
    pub missing_metric_policy: MissingMetricPolicy,

    /// Breakdown entry used as the score of per-platform metrics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_platform: Option<String>,

    /// Orders metrics by cost class
    #[serde(default)]
    pub priority_function: PriorityFunction,

    /// The metrics to evaluate
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricConfig {
    pub name: String,

    pub weight: f64,

    pub cost_class: CostClass,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_pool_size() -> usize {
    4
}

const fn default_metric_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_cache_ttl() -> Duration {
    Duration::from_hours(24)
}

const fn default_clone_timeout() -> Duration {
    Duration::from_mins(5)
}

const fn default_enabled() -> bool {
    true
}

fn default_metrics() -> Vec<MetricConfig> {
    METRIC_DEFINITIONS
        .iter()
        .map(|def| MetricConfig {
            name: def.name.to_string(),
            weight: def.default_weight,
            cost_class: def.cost_class,
            timeout: None,
            enabled: true,
        })
        .collect()
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `appraise.toml` in `base_dir` is used when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it is invalid
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!(target: LOG_TARGET, "No configuration file at '{path}', using defaults");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config
            .validate()
            .into_app_err_with(|| format!("validating configuration file '{final_path}'"))?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Check every setting that would otherwise only fail once evaluation starts.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        self.settings().validate()?;

        if self.metric_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("metric_timeout".to_string()));
        }

        let mut seen = HashSet::new();
        for metric in &self.metrics {
            if find_metric_def(&metric.name).is_none() {
                return Err(ConfigError::UnknownMetric(metric.name.clone()));
            }

            if !seen.insert(metric.name.as_str()) {
                return Err(ConfigError::DuplicateMetric(metric.name.clone()));
            }
        }

        let _ = self.catalog()?;
        Ok(())
    }

    /// The pipeline knobs of this configuration.
    #[must_use]
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            pool_size: self.pool_size,
            priority_function: self.priority_function,
            missing_metric_policy: self.missing_metric_policy,
            target_platform: self.target_platform.clone(),
        }
    }

    /// Instantiate the enabled metrics.
    pub fn catalog(&self) -> core::result::Result<MetricCatalog, ConfigError> {
        let mut entries = Vec::with_capacity(self.metrics.len());

        for metric in self.metrics.iter().filter(|m| m.enabled) {
            let def = find_metric_def(&metric.name).ok_or_else(|| ConfigError::UnknownMetric(metric.name.clone()))?;

            entries.push(CatalogEntry::new(
                (def.factory)(),
                MetricDescriptor::new(def.name, metric.cost_class, metric.weight),
                metric.timeout.unwrap_or(self.metric_timeout),
            ));
        }

        MetricCatalog::new(entries)
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
