use super::{NullProgress, Progress, StagedMetric, WorkerPool};
use crate::artifacts::LocalArtifactHandle;
use crate::metrics::{Budget, MetricError, MetricResult};
use crate::store::ResultStore;
use core::panic::AssertUnwindSafe;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use futures::FutureExt;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;

const LOG_TARGET: &str = "    runner";

/// Executes staged metrics on a bounded worker pool.
///
/// Every staged metric yields exactly one [`MetricResult`]: cache hits are reused as-is,
/// errors become `Failed`, deadlines become `TimedOut`, and a panicking metric is
/// contained to its own result. The returned results are sorted by metric name.
///
/// Stored results are loaded once per run for every artifact a staged metric targets.
/// A metric's subject is looked up first, then the evaluated artifact.
#[derive(Clone)]
pub struct MetricRunner {
    pool: Arc<WorkerPool>,
    store: Arc<dyn ResultStore>,
    progress: Arc<dyn Progress>,
}

impl core::fmt::Debug for MetricRunner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MetricRunner")
            .field("pool", &self.pool)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl MetricRunner {
    #[must_use]
    pub fn new(pool: Arc<WorkerPool>, store: Arc<dyn ResultStore>) -> Self {
        Self {
            pool,
            store,
            progress: Arc::new(NullProgress),
        }
    }

    #[must_use]
    pub fn with_progress(self, progress: Arc<dyn Progress>) -> Self {
        Self { progress, ..self }
    }

    /// Run `staged` against `artifact`, submitting work in the staged order.
    pub async fn run(&self, artifact: Arc<LocalArtifactHandle>, staged: Vec<StagedMetric>) -> Vec<MetricResult> {
        let key = artifact.artifact().key();
        let total = staged.len();
        let collected = Arc::new(Mutex::new(Vec::with_capacity(total)));
        let completed = Arc::new(AtomicUsize::new(0));

        {
            let completed = Arc::clone(&completed);
            let key = key.clone();
            self.progress.set_determinate(Box::new(move || {
                (total as u64, completed.load(Ordering::Relaxed) as u64, key.clone())
            }));
        }

        let cached = self.load_cached(&key, &staged).await;
        let mut handles: Vec<(String, Instant, JoinHandle<()>)> = Vec::with_capacity(total);

        for metric in staged {
            if let Some(hit) = cached_hit(&cached, &key, &metric) {
                collected.lock().expect("lock poisoned").push(hit);
                let _ = completed.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            let Some(subject) = metric.subject_handle().cloned() else {
                log::debug!(target: LOG_TARGET, "Skipping '{}' for '{key}': '{}' has no local files", metric.name(), metric.subject());
                collected.lock().expect("lock poisoned").push(MetricResult::skipped(
                    metric.name(),
                    format!("'{}' is not available locally and has no stored result", metric.subject()),
                    Duration::ZERO,
                ));
                let _ = completed.fetch_add(1, Ordering::Relaxed);
                continue;
            };

            let permit = self.pool.acquire().await;
            log::debug!(target: LOG_TARGET, "Starting '{}' for '{key}' (priority {:.3})", metric.name(), metric.priority());

            let name = metric.name().to_string();
            let started = Instant::now();
            let collected = Arc::clone(&collected);
            let completed = Arc::clone(&completed);

            let handle = tokio::spawn(async move {
                let result = evaluate_one(&metric, &subject).await;
                drop(permit);

                collected.lock().expect("lock poisoned").push(result);
                let _ = completed.fetch_add(1, Ordering::Relaxed);
            });

            handles.push((name, started, handle));
        }

        for (name, started, handle) in handles {
            if let Err(e) = handle.await {
                log::warn!(target: LOG_TARGET, "Evaluation task for '{name}' was lost: {e}");
                collected
                    .lock()
                    .expect("lock poisoned")
                    .push(MetricResult::failed(name, format!("evaluation task failed: {e}"), started.elapsed()));
            }
        }

        let mut results = core::mem::take(&mut *collected.lock().expect("lock poisoned"));
        results.sort_by(|a, b| a.name().cmp(b.name()));
        results
    }

    /// Fresh stored results for the evaluated artifact and every staged subject, keyed by
    /// artifact key. A failing store only costs the cache.
    async fn load_cached(&self, key: &str, staged: &[StagedMetric]) -> HashMap<String, BTreeMap<String, MetricResult>> {
        if staged.is_empty() {
            return HashMap::new();
        }

        let mut keys: BTreeSet<String> = staged.iter().map(|metric| metric.subject().key()).collect();
        let _ = keys.insert(key.to_string());

        let store = Arc::clone(&self.store);
        let loading = tokio::task::spawn_blocking(move || {
            keys.into_iter()
                .map(|key| {
                    let results = store.cached_results(&key).unwrap_or_else(|e| {
                        log::warn!(target: LOG_TARGET, "Could not read stored results for '{key}', evaluating instead: {e:#}");
                        BTreeMap::new()
                    });
                    (key, results)
                })
                .collect::<HashMap<_, _>>()
        });

        loading.await.unwrap_or_else(|e| {
            log::warn!(target: LOG_TARGET, "Loading stored results for '{key}' failed: {e}");
            HashMap::new()
        })
    }
}

fn cached_hit(cached: &HashMap<String, BTreeMap<String, MetricResult>>, key: &str, metric: &StagedMetric) -> Option<MetricResult> {
    let subject_key = metric.subject().key();

    let hit = [subject_key.as_str(), key]
        .into_iter()
        .find_map(|k| cached.get(k).and_then(|results| results.get(metric.name())))
        .filter(|result| result.is_success())?;

    log::debug!(target: LOG_TARGET, "Using stored '{}' of '{subject_key}' for '{key}'", metric.name());
    Some(hit.clone().into_cached())
}

async fn evaluate_one(staged: &StagedMetric, artifact: &LocalArtifactHandle) -> MetricResult {
    let name = staged.name();
    let timeout = staged.timeout();
    let started = Instant::now();

    let evaluation = AssertUnwindSafe(staged.metric().evaluate(artifact, Budget::new(timeout))).catch_unwind();
    let outcome = tokio::time::timeout(timeout, evaluation).await;
    let latency = started.elapsed();

    let result = match outcome {
        Err(_) => MetricResult::timed_out(name, latency),
        Ok(Err(panic)) => MetricResult::failed(name, format!("metric panicked: {}", panic_message(&*panic)), latency),
        Ok(Ok(Ok(value))) if value.is_in_range() => MetricResult::success(name, value, latency),
        Ok(Ok(Ok(value))) => MetricResult::failed(name, format!("value out of range: {value:?}"), latency),
        Ok(Ok(Err(MetricError::BudgetExhausted))) => MetricResult::timed_out(name, latency),
        // whatever broke once the deadline had passed, the deadline is what stopped it
        Ok(Ok(Err(MetricError::Execution(_)))) if latency >= timeout => MetricResult::timed_out(name, latency),
        Ok(Ok(Err(MetricError::Unavailable(reason)))) => MetricResult::skipped(name, reason, latency),
        Ok(Ok(Err(e @ MetricError::Execution(_)))) => MetricResult::failed(name, e.to_string(), latency),
    };

    log::debug!(
        target: LOG_TARGET,
        "'{name}' finished for '{}' with status {} in {:.3}s",
        artifact.artifact(),
        result.status(),
        latency.as_secs_f64()
    );

    result
}

fn panic_message(panic: &(dyn core::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
