use super::{ResultStore, StorageError};
use crate::metrics::MetricResult;
use crate::pipeline::AnalyzerOutput;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// An in-process result store.
///
/// Successful, freshly computed results are kept for reuse; every persisted output is
/// retained in order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    results: HashMap<String, HashMap<String, MetricResult>>,
    outputs: Vec<AnalyzerOutput>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every output persisted so far.
    #[must_use]
    pub fn outputs(&self) -> Vec<AnalyzerOutput> {
        self.state.lock().expect("lock poisoned").outputs.clone()
    }
}

impl ResultStore for MemoryStore {
    fn cached_results(&self, artifact_key: &str) -> Result<BTreeMap<String, MetricResult>, StorageError> {
        let state = self.state.lock().expect("lock poisoned");
        Ok(state
            .results
            .get(artifact_key)
            .map(|results| results.iter().map(|(name, result)| (name.clone(), result.clone())).collect())
            .unwrap_or_default())
    }

    fn put_result(&self, artifact_key: &str, output: &AnalyzerOutput) -> Result<(), StorageError> {
        let mut state = self.state.lock().expect("lock poisoned");
        let results = state.results.entry(artifact_key.to_string()).or_default();

        for result in output.results().iter().filter(|r| r.is_success() && !r.from_cache()) {
            let _ = results.insert(result.name().to_string(), result.clone());
        }

        state.outputs.push(output.clone());
        Ok(())
    }
}
