use super::{ConfigError, MissingMetricPolicy, PriorityFunction};

/// Knobs of the evaluation pipeline, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub pool_size: usize,
    pub priority_function: PriorityFunction,
    pub missing_metric_policy: MissingMetricPolicy,
    pub target_platform: Option<String>,
}

impl PipelineSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }

        self.priority_function.validate()
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            pool_size: 4,
            priority_function: PriorityFunction::default(),
            missing_metric_policy: MissingMetricPolicy::default(),
            target_platform: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_settings() {
        assert_eq!(PipelineSettings::default().validate(), Ok(()));

        let empty = PipelineSettings {
            pool_size: 0,
            ..PipelineSettings::default()
        };
        assert_eq!(empty.validate(), Err(ConfigError::EmptyPool));

        let flat = PipelineSettings {
            priority_function: PriorityFunction::ExponentialDecay { k: 0.0 },
            ..PipelineSettings::default()
        };
        assert_eq!(flat.validate(), Err(ConfigError::InvalidDecayRate(0.0)));
    }
}
