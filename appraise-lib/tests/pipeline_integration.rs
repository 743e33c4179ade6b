//! End-to-end tests of the evaluation pipeline with scripted metrics and an in-memory
//! store, covering scoring, timeouts, failure isolation, concurrency and caching.

use appraise_lib::artifacts::{ArtifactCategory, ArtifactRef, ArtifactRequest, LocalArtifactHandle, ResolutionError, Resolver};
use appraise_lib::metrics::{
    Budget, CatalogEntry, CostClass, Metric, MetricCatalog, MetricDescriptor, MetricError, MetricResult, MetricStatus, MetricTarget, MetricValue,
};
use appraise_lib::pipeline::{AnalyzerOutput, EvaluationError, MissingMetricPolicy, Pipeline, PipelineSettings, PriorityFunction};
use appraise_lib::store::{MemoryStore, ResultStore, StorageError};
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
enum Script {
    Value(f64),
    Fail,
    Hang,
    Panic,
    SleepThen(u64, f64),
}

/// A metric that behaves as scripted and counts how often it runs.
#[derive(Debug)]
struct ScriptedMetric {
    name: &'static str,
    script: Script,
    applies: bool,
    target: MetricTarget,
    calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    start_order: Arc<Mutex<Vec<&'static str>>>,
}

impl Metric for ScriptedMetric {
    fn name(&self) -> &'static str {
        self.name
    }

    fn target(&self) -> MetricTarget {
        self.target
    }

    fn applies(&self, _artifact: &LocalArtifactHandle) -> bool {
        self.applies
    }

    fn evaluate<'a>(&'a self, _artifact: &'a LocalArtifactHandle, _budget: Budget) -> BoxFuture<'a, Result<MetricValue, MetricError>> {
        Box::pin(async move {
            self.start_order.lock().unwrap().push(self.name);
            let _ = self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let outcome = match self.script {
                Script::Value(v) => Ok(MetricValue::Score(v)),
                Script::Fail => Err(MetricError::Execution("configured to fail".into())),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(MetricValue::Score(1.0))
                }
                Script::Panic => panic!("metric blew up"),
                Script::SleepThen(ms, v) => {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok(MetricValue::Score(v))
                }
            };

            let _ = self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        })
    }
}

struct Scripted {
    name: &'static str,
    weight: f64,
    cost: CostClass,
    script: Script,
    applies: bool,
    target: MetricTarget,
}

const fn scripted(name: &'static str, weight: f64, script: Script) -> Scripted {
    Scripted {
        name,
        weight,
        cost: CostClass::Low,
        script,
        applies: true,
        target: MetricTarget::Artifact,
    }
}

struct Harness {
    catalog: MetricCatalog,
    metrics: Vec<Arc<ScriptedMetric>>,
    max_in_flight: Arc<AtomicUsize>,
    start_order: Arc<Mutex<Vec<&'static str>>>,
}

fn harness(setups: Vec<Scripted>, timeout: Duration) -> Harness {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));
    let start_order = Arc::new(Mutex::new(Vec::new()));

    let metrics: Vec<_> = setups
        .iter()
        .map(|s| {
            Arc::new(ScriptedMetric {
                name: s.name,
                script: s.script,
                applies: s.applies,
                target: s.target,
                calls: AtomicUsize::new(0),
                in_flight: Arc::clone(&in_flight),
                max_in_flight: Arc::clone(&max_in_flight),
                start_order: Arc::clone(&start_order),
            })
        })
        .collect();

    let catalog = MetricCatalog::new(setups.iter().zip(&metrics).map(|(s, m)| {
        CatalogEntry::new(Arc::clone(m) as Arc<dyn Metric>, MetricDescriptor::new(s.name, s.cost, s.weight), timeout)
    }))
    .unwrap();

    Harness {
        catalog,
        metrics,
        max_in_flight,
        start_order,
    }
}

/// Resolves every artifact to a fixed directory, or fails with the given error.
#[derive(Debug)]
struct FixedResolver(Option<ResolutionError>);

impl Resolver for FixedResolver {
    fn resolve<'a>(&'a self, artifact: &'a ArtifactRef) -> BoxFuture<'a, Result<LocalArtifactHandle, ResolutionError>> {
        Box::pin(async move {
            match &self.0 {
                Some(e) => Err(e.clone()),
                None => Ok(LocalArtifactHandle::new(artifact.clone(), "/nonexistent")),
            }
        })
    }
}

/// Resolves everything except datasets.
#[derive(Debug)]
struct NoDatasets;

impl Resolver for NoDatasets {
    fn resolve<'a>(&'a self, artifact: &'a ArtifactRef) -> BoxFuture<'a, Result<LocalArtifactHandle, ResolutionError>> {
        Box::pin(async move {
            if artifact.category() == ArtifactCategory::Dataset {
                Err(ResolutionError::NotFound {
                    artifact: artifact.to_string(),
                })
            } else {
                Ok(LocalArtifactHandle::new(artifact.clone(), "/nonexistent"))
            }
        })
    }
}

#[derive(Debug)]
struct UnavailableStore;

impl ResultStore for UnavailableStore {
    fn cached_results(&self, _artifact_key: &str) -> Result<BTreeMap<String, MetricResult>, StorageError> {
        Err(StorageError::Unavailable("database offline".into()))
    }

    fn put_result(&self, _artifact_key: &str, _output: &AnalyzerOutput) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("database offline".into()))
    }
}

fn artifact() -> ArtifactRef {
    ArtifactRef::new("https://huggingface.co/org/model", ArtifactCategory::Model)
}

fn pipeline_with(catalog: MetricCatalog, store: Arc<dyn ResultStore>, settings: PipelineSettings) -> Pipeline {
    Pipeline::new(settings, catalog, Arc::new(FixedResolver(None)), store).unwrap()
}

async fn evaluate(h: Harness) -> AnalyzerOutput {
    pipeline_with(h.catalog, Arc::new(MemoryStore::new()), PipelineSettings::default())
        .evaluate(&artifact())
        .await
        .unwrap()
}

#[tokio::test]
async fn all_successful_equal_weights_score_one() {
    let h = harness(
        vec![scripted("a", 1.0, Script::Value(1.0)), scripted("b", 1.0, Script::Value(1.0)), scripted("c", 1.0, Script::Value(1.0))],
        Duration::from_secs(1),
    );

    let output = evaluate(h).await;
    assert!((output.net_score() - 1.0).abs() < 1e-9);
    assert!(output.has_applicable_metrics());
}

#[tokio::test]
async fn all_failed_score_zero_but_are_applicable() {
    let h = harness(vec![scripted("a", 0.5, Script::Fail), scripted("b", 0.5, Script::Panic)], Duration::from_secs(1));

    let output = evaluate(h).await;
    assert!(output.net_score().abs() < f64::EPSILON);
    assert!(output.has_applicable_metrics());
    assert!(output.results().iter().all(|r| r.status() == MetricStatus::Failed));
}

#[tokio::test]
async fn failed_license_is_penalized() {
    let h = harness(vec![scripted("size", 0.3, Script::Value(0.8)), scripted("license", 0.7, Script::Fail)], Duration::from_secs(1));

    let output = evaluate(h).await;
    assert!((output.net_score() - 0.24).abs() < 1e-9);

    let license = output.result("license").unwrap();
    assert_eq!(license.status(), MetricStatus::Failed);
    assert_eq!(license.error(), Some("configured to fail"));
}

#[tokio::test]
async fn ignore_policy_leaves_failures_out() {
    let h = harness(vec![scripted("size", 0.3, Script::Value(0.8)), scripted("license", 0.7, Script::Fail)], Duration::from_secs(1));
    let settings = PipelineSettings {
        missing_metric_policy: MissingMetricPolicy::Ignore,
        ..PipelineSettings::default()
    };

    let output = pipeline_with(h.catalog, Arc::new(MemoryStore::new()), settings)
        .evaluate(&artifact())
        .await
        .unwrap();
    assert!((output.net_score() - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn nothing_applicable_is_flagged() {
    let mut only = scripted("code_only", 1.0, Script::Value(1.0));
    only.applies = false;
    let h = harness(vec![only], Duration::from_secs(1));

    let output = evaluate(h).await;
    assert!(output.results().is_empty());
    assert!(output.net_score().abs() < f64::EPSILON);
    assert!(!output.has_applicable_metrics());
}

#[tokio::test]
async fn hanging_metric_times_out_and_batch_completes() {
    let h = harness(
        vec![scripted("fast", 1.0, Script::Value(1.0)), scripted("stuck", 1.0, Script::Hang)],
        Duration::from_millis(200),
    );

    let started = Instant::now();
    let output = evaluate(h).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(output.result("stuck").unwrap().status(), MetricStatus::TimedOut);
    assert_eq!(output.result("fast").unwrap().status(), MetricStatus::Success);
    assert!((output.net_score() - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn exactly_one_result_per_staged_metric_in_name_order() {
    let mut skipped = scripted("d_not_applicable", 1.0, Script::Value(1.0));
    skipped.applies = false;
    let mut expensive = scripted("e_expensive", 1.0, Script::SleepThen(30, 0.5));
    expensive.cost = CostClass::High;

    let h = harness(
        vec![
            scripted("z_last", 1.0, Script::SleepThen(10, 1.0)),
            scripted("a_first", 1.0, Script::Fail),
            scripted("m_middle", 1.0, Script::Panic),
            skipped,
            expensive,
        ],
        Duration::from_secs(2),
    );

    let output = evaluate(h).await;
    let names: Vec<_> = output.results().iter().map(|r| r.name()).collect();
    assert_eq!(names, ["a_first", "e_expensive", "m_middle", "z_last"]);
}

#[tokio::test]
async fn pool_bounds_concurrency() {
    let metrics = ["a", "b", "c", "d", "e", "f"]
        .into_iter()
        .map(|name| scripted(name, 1.0, Script::SleepThen(50, 1.0)))
        .collect();
    let h = harness(metrics, Duration::from_secs(5));
    let max_in_flight = Arc::clone(&h.max_in_flight);

    let settings = PipelineSettings {
        pool_size: 2,
        ..PipelineSettings::default()
    };
    let output = pipeline_with(h.catalog, Arc::new(MemoryStore::new()), settings)
        .evaluate(&artifact())
        .await
        .unwrap();

    assert_eq!(output.results().len(), 6);
    assert!(max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn single_worker_starts_metrics_by_priority_then_name() {
    let with_cost = |name, cost| Scripted {
        cost,
        ..scripted(name, 1.0, Script::Value(1.0))
    };
    let h = harness(
        vec![
            with_cost("zeta", CostClass::Low),
            with_cost("walk", CostClass::High),
            with_cost("git", CostClass::Medium),
            with_cost("alpha", CostClass::Low),
            with_cost("blame", CostClass::Medium),
            with_cost("mid", CostClass::Low),
        ],
        Duration::from_secs(1),
    );
    let start_order = Arc::clone(&h.start_order);

    for priority_function in [PriorityFunction::ExponentialDecay { k: 0.5 }, PriorityFunction::Reciprocal] {
        start_order.lock().unwrap().clear();
        let settings = PipelineSettings {
            pool_size: 1,
            priority_function,
            ..PipelineSettings::default()
        };

        let _ = pipeline_with(h.catalog.clone(), Arc::new(MemoryStore::new()), settings)
            .evaluate(&artifact())
            .await
            .unwrap();

        assert_eq!(*start_order.lock().unwrap(), ["alpha", "mid", "zeta", "blame", "git", "walk"]);
    }
}

#[tokio::test]
async fn linked_datasets_reuse_stored_results_or_are_skipped() {
    let card = Scripted {
        target: MetricTarget::Dataset,
        ..scripted("card", 1.0, Script::Value(0.4))
    };
    let h = harness(vec![card, scripted("readme", 1.0, Script::Value(1.0))], Duration::from_secs(1));
    let store: Arc<dyn ResultStore> = Arc::new(MemoryStore::new());
    let dataset = ArtifactRef::new("https://huggingface.co/datasets/org/data", ArtifactCategory::Dataset);

    // the dataset evaluated on its own leaves its results in the store
    let standalone = pipeline_with(h.catalog.clone(), Arc::clone(&store), PipelineSettings::default())
        .evaluate(&dataset)
        .await
        .unwrap();
    assert_eq!(standalone.result("card").unwrap().status(), MetricStatus::Success);

    let pipeline = Pipeline::new(PipelineSettings::default(), h.catalog, Arc::new(NoDatasets), Arc::clone(&store)).unwrap();
    let request = ArtifactRequest::new(artifact()).with_dataset(dataset.clone());
    let output = pipeline.evaluate_request(&request).await.unwrap();

    let card = output.result("card").unwrap();
    assert!(card.from_cache());
    assert_eq!(card.value(), Some(&MetricValue::Score(0.4)));
    assert_eq!(output.dataset(), Some(&dataset));
    assert_eq!(h.metrics[0].calls.load(Ordering::SeqCst), 1);

    let unknown = ArtifactRequest::new(artifact()).with_dataset(ArtifactRef::new("https://huggingface.co/datasets/org/other", ArtifactCategory::Dataset));
    let output = pipeline.evaluate_request(&unknown).await.unwrap();
    assert_eq!(output.result("card").unwrap().status(), MetricStatus::Skipped);
    assert_eq!(output.result("readme").unwrap().status(), MetricStatus::Success);
    assert_eq!(h.metrics[0].calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn models_without_links_skip_linked_metrics() {
    let card = Scripted {
        target: MetricTarget::Dataset,
        ..scripted("card", 1.0, Script::Value(0.4))
    };
    let h = harness(vec![card, scripted("readme", 1.0, Script::Value(1.0))], Duration::from_secs(1));

    let output = evaluate(h).await;
    let names: Vec<_> = output.results().iter().map(|r| r.name()).collect();
    assert_eq!(names, ["readme"]);
    assert!(output.location().is_some_and(|path| path == "/nonexistent"));
}

#[tokio::test]
async fn warm_cache_gives_identical_scores() {
    let h = harness(
        vec![scripted("size", 0.3, Script::Value(0.8)), scripted("license", 0.7, Script::Fail)],
        Duration::from_secs(1),
    );
    let store: Arc<dyn ResultStore> = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(
        PipelineSettings::default(),
        h.catalog,
        Arc::new(FixedResolver(None)),
        Arc::clone(&store),
    )
    .unwrap();

    let first = pipeline.evaluate(&artifact()).await.unwrap();
    let second = pipeline.evaluate(&artifact()).await.unwrap();

    assert!((first.net_score() - second.net_score()).abs() < f64::EPSILON);
    for (a, b) in first.results().iter().zip(second.results()) {
        assert_eq!(a.name(), b.name());
        assert_eq!(a.value(), b.value());
        assert_eq!(a.status(), b.status());
    }

    // successes come from the cache, failures are retried
    let size = &h.metrics[0];
    let license = &h.metrics[1];
    assert_eq!(size.calls.load(Ordering::SeqCst), 1);
    assert_eq!(license.calls.load(Ordering::SeqCst), 2);
    assert!(second.result("size").unwrap().from_cache());
    assert_eq!(second.result("size").unwrap().latency(), Duration::ZERO);
}

#[tokio::test]
async fn unavailable_store_degrades_to_uncached_evaluation() {
    let h = harness(vec![scripted("a", 1.0, Script::Value(0.5))], Duration::from_secs(1));

    let output = pipeline_with(h.catalog, Arc::new(UnavailableStore), PipelineSettings::default())
        .evaluate(&artifact())
        .await
        .unwrap();

    assert!((output.net_score() - 0.5).abs() < 1e-9);
    assert!(!output.results()[0].from_cache());
}

#[tokio::test]
async fn resolution_failure_produces_no_output() {
    let h = harness(vec![scripted("a", 1.0, Script::Value(1.0))], Duration::from_secs(1));
    let store = Arc::new(MemoryStore::new());
    let not_found = ResolutionError::NotFound {
        artifact: artifact().to_string(),
    };

    let pipeline = Pipeline::new(
        PipelineSettings::default(),
        h.catalog,
        Arc::new(FixedResolver(Some(not_found.clone()))),
        Arc::clone(&store) as Arc<dyn ResultStore>,
    )
    .unwrap();

    let err = pipeline.evaluate(&artifact()).await.unwrap_err();
    assert_eq!(err, EvaluationError::Resolution(not_found));
    assert!(store.outputs().is_empty());
    assert_eq!(h.metrics[0].calls.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_settings_are_rejected_up_front() {
    let h = harness(vec![scripted("a", 1.0, Script::Value(1.0))], Duration::from_secs(1));
    let settings = PipelineSettings {
        priority_function: PriorityFunction::ExponentialDecay { k: f64::NAN },
        ..PipelineSettings::default()
    };

    assert!(Pipeline::new(settings, h.catalog, Arc::new(FixedResolver(None)), Arc::new(MemoryStore::new())).is_err());
}
