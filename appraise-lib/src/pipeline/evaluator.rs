use super::{
    AnalyzerOutput, ConfigError, InvalidInput, MetricRunner, MetricStager, NetScoreCalculator, NullProgress, PipelineSettings, Progress,
    StagedMetric, WorkerPool,
};
use super::dataset_inference;
use crate::artifacts::{ArtifactCategory, ArtifactRef, ArtifactRequest, LinkedArtifact, LocalArtifactHandle, ResolutionError, Resolver};
use crate::metrics::MetricCatalog;
use crate::store::ResultStore;
use std::sync::Arc;
use std::time::Instant;

const LOG_TARGET: &str = "  pipeline";

/// Why an artifact could not be evaluated at all.
///
/// Problems with individual metrics never show up here; they are recorded on the
/// artifact's [`AnalyzerOutput`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    InvalidPriority(#[from] InvalidInput),
}

/// Resolves, stages, runs and scores artifacts.
pub struct Pipeline {
    catalog: Arc<MetricCatalog>,
    resolver: Arc<dyn Resolver>,
    store: Arc<dyn ResultStore>,
    stager: MetricStager,
    runner: MetricRunner,
    calculator: NetScoreCalculator,
    progress: Arc<dyn Progress>,
}

impl core::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pipeline")
            .field("catalog", &self.catalog)
            .field("resolver", &self.resolver)
            .field("stager", &self.stager)
            .field("runner", &self.runner)
            .field("calculator", &self.calculator)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Assemble a pipeline, rejecting invalid settings before anything runs.
    pub fn new(
        settings: PipelineSettings,
        catalog: MetricCatalog,
        resolver: Arc<dyn Resolver>,
        store: Arc<dyn ResultStore>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        let stager = MetricStager::new(settings.priority_function)?;
        let runner = MetricRunner::new(WorkerPool::new(settings.pool_size), Arc::clone(&store));
        let calculator = NetScoreCalculator::new(settings.missing_metric_policy, settings.target_platform, Arc::clone(&store));

        Ok(Self {
            catalog: Arc::new(catalog),
            resolver,
            store,
            stager,
            runner,
            calculator,
            progress: Arc::new(NullProgress),
        })
    }

    #[must_use]
    pub fn with_progress(self, progress: Arc<dyn Progress>) -> Self {
        Self {
            runner: self.runner.with_progress(Arc::clone(&progress)),
            progress,
            ..self
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Evaluate one artifact on its own.
    pub async fn evaluate(&self, artifact: &ArtifactRef) -> Result<AnalyzerOutput, EvaluationError> {
        self.evaluate_request(&ArtifactRequest::new(artifact.clone())).await
    }

    /// Evaluate an artifact together with the code and dataset named in `request`.
    ///
    /// Fails only when the artifact itself cannot be resolved; otherwise every applicable
    /// metric has a result in the returned output, whatever happened to it. Links that
    /// cannot be resolved are kept, and metrics targeting them fall back to stored
    /// results. A model without a dataset link borrows one from its README.
    pub async fn evaluate_request(&self, request: &ArtifactRequest) -> Result<AnalyzerOutput, EvaluationError> {
        let started = Instant::now();
        let artifact = request.artifact();

        self.progress.set_phase("Resolving");
        {
            let label = artifact.to_string();
            self.progress.set_indeterminate(Box::new(move || label.clone()));
        }

        let handle = self.resolver.resolve(artifact).await?;
        log::info!(target: LOG_TARGET, "Resolved '{artifact}' to '{}'", handle.root());

        let code = match request.code() {
            Some(code) => Some(self.link(code).await),
            None => None,
        };
        let dataset = match request.dataset() {
            Some(dataset) => Some(self.link(dataset).await),
            None => self.infer_dataset(&handle).await,
        };
        let handle = Arc::new(handle.with_code(code).with_dataset(dataset));

        let staged = self.stager.stage(&handle, &self.catalog)?;
        log::debug!(
            target: LOG_TARGET,
            "Staged {} of {} metrics for '{artifact}': {}",
            staged.len(),
            self.catalog.len(),
            staged.iter().map(StagedMetric::name).collect::<Vec<_>>().join(", ")
        );

        self.progress.set_phase("Evaluating");
        let results = self.runner.run(Arc::clone(&handle), staged).await;

        let output = self.calculator.finalize(&handle, results, &self.catalog, started).await;
        log::info!(
            target: LOG_TARGET,
            "Evaluated '{artifact}' in {:.3}s, net score {:.3}",
            output.total_latency().as_secs_f64(),
            output.net_score()
        );

        Ok(output)
    }

    async fn link(&self, artifact: &ArtifactRef) -> LinkedArtifact {
        match self.resolver.resolve(artifact).await {
            Ok(handle) => {
                log::debug!(target: LOG_TARGET, "Resolved linked '{artifact}' to '{}'", handle.root());
                LinkedArtifact::new(artifact.clone(), Some(Arc::new(handle)))
            }
            Err(e) => {
                log::info!(target: LOG_TARGET, "Linked '{artifact}' is not available locally: {e}");
                LinkedArtifact::new(artifact.clone(), None)
            }
        }
    }

    async fn infer_dataset(&self, model: &LocalArtifactHandle) -> Option<LinkedArtifact> {
        if model.category() != ArtifactCategory::Model {
            return None;
        }

        let store = Arc::clone(&self.store);
        let readme_owner = model.clone();
        let inferred = tokio::task::spawn_blocking(move || dataset_inference::infer_dataset(&readme_owner, store.as_ref()))
            .await
            .unwrap_or_else(|e| {
                log::warn!(target: LOG_TARGET, "Looking for the dataset of '{}' failed: {e}", model.artifact());
                None
            })?;

        log::info!(target: LOG_TARGET, "Using dataset '{inferred}' linked from the README of '{}'", model.artifact());
        Some(self.link(&inferred).await)
    }
}
