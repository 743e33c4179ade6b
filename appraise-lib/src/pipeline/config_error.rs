/// Invalid weights, priority parameters or limits, detected before anything is evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("metric '{0}' is configured more than once")]
    DuplicateMetric(String),

    #[error("metric '{configured}' is implemented by a metric named '{reported}'")]
    NameMismatch { configured: String, reported: String },

    #[error("weight of metric '{name}' must be a finite, non-negative number, got {weight}")]
    InvalidWeight { name: String, weight: f64 },

    #[error("the exponential decay rate must be a finite, positive number, got {0}")]
    InvalidDecayRate(f64),

    #[error("the worker pool needs at least one worker")]
    EmptyPool,

    #[error("the timeout for {0} must be greater than zero")]
    ZeroTimeout(String),
}
