use crate::metrics::MetricResult;
use crate::pipeline::AnalyzerOutput;
use core::fmt::Debug;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A failure of the result store.
///
/// Storage problems never affect scores: callers log them and carry on without caching.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not access '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode stored results")]
    Encoding(#[from] serde_json::Error),

    #[error("the result store is unavailable: {0}")]
    Unavailable(String),
}

/// Where metric results and analyzer outputs are cached and persisted.
///
/// Artifacts are identified by [`ArtifactRef::key`](crate::artifacts::ArtifactRef::key).
/// Implementations may block; async callers go through `spawn_blocking`.
pub trait ResultStore: Send + Sync + Debug {
    /// Every previously computed, still fresh successful result for the artifact, keyed
    /// by metric name.
    fn cached_results(&self, artifact_key: &str) -> Result<BTreeMap<String, MetricResult>, StorageError>;

    /// Persist the outcome of an evaluation.
    fn put_result(&self, artifact_key: &str, output: &AnalyzerOutput) -> Result<(), StorageError>;
}
