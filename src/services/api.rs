//! Service facade: one typed operation per caller-facing action.
//!
//! Constructed once at startup and shared; holds no mutable state beyond
//! the artifact directory on disk.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::info;

use crate::config::ClassifierConfig;
use crate::models::{
    BatchResponse, BatchTable, HealthReport, HealthStatus, PredictionRequest, PredictionResponse,
    ServiceInfo,
};
use crate::services::artifacts::ArtifactStore;
use crate::services::batch::BatchEvaluator;
use crate::services::classifier::InferenceEngine;
use crate::services::progress::{noop_progress, ProgressReporter};
use crate::utils::sanitize::artifact_name_from_locator;
use crate::vocabulary::LabelVocabulary;
use crate::ClassifierError;

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct MlService {
    engine: InferenceEngine,
    artifacts: ArtifactStore,
    default_threshold: f32,
    max_sequence_length: usize,
}

impl MlService {
    pub fn new(engine: InferenceEngine, artifacts: ArtifactStore, config: &ClassifierConfig) -> Self {
        Self {
            engine,
            artifacts,
            default_threshold: config.default_threshold,
            max_sequence_length: config.max_sequence_length,
        }
    }

    /// Service whose artifacts live in `artifact_dir` with the configured TTL.
    pub fn with_artifact_dir(
        engine: InferenceEngine,
        artifact_dir: PathBuf,
        config: &ClassifierConfig,
    ) -> Self {
        let artifacts =
            ArtifactStore::new(artifact_dir, Duration::from_secs(config.artifact_ttl_secs));
        Self::new(engine, artifacts, config)
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    fn ready_vocabulary(&self) -> Result<&Arc<LabelVocabulary>, ClassifierError> {
        self.engine
            .vocabulary()
            .filter(|_| self.engine.is_ready())
            .ok_or_else(|| self.engine.not_ready())
    }

    /// Classify a single text.
    pub async fn predict(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionResponse, ClassifierError> {
        self.ready_vocabulary()?;
        let threshold = request.threshold.unwrap_or(self.default_threshold);
        let result = self.engine.predict(&request.text, threshold).await?;
        Ok(PredictionResponse::from(result))
    }

    /// Evaluate a table without progress reporting.
    pub async fn evaluate_batch(
        &self,
        table: &BatchTable,
        threshold: Option<f32>,
    ) -> Result<BatchResponse, ClassifierError> {
        self.evaluate_batch_with_progress(table, threshold, noop_progress())
            .await
    }

    /// Classify every row, score against `group`, and persist the annotated table.
    pub async fn evaluate_batch_with_progress(
        &self,
        table: &BatchTable,
        threshold: Option<f32>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<BatchResponse, ClassifierError> {
        self.ready_vocabulary()?;
        let threshold = threshold.unwrap_or(self.default_threshold);
        let started = Instant::now();

        let evaluation = BatchEvaluator::new(self.engine.clone(), progress)
            .evaluate(table, threshold)
            .await?;
        let handle = self.artifacts.persist(table, &evaluation.rows)?;

        let processing_time_secs = started.elapsed().as_secs_f64();
        info!(
            "Batch of {} rows evaluated in {:.2}s -> {}",
            evaluation.total_processed(),
            processing_time_secs,
            handle.locator
        );

        Ok(BatchResponse {
            success: true,
            total_processed: evaluation.total_processed(),
            failed_rows: evaluation.failed_rows,
            processing_time_secs,
            metrics: evaluation.metrics,
            download_locator: handle.locator,
        })
    }

    /// Resolve a result artifact by name or `download/<name>` locator.
    pub fn fetch_artifact(&self, name: &str) -> Result<PathBuf, ClassifierError> {
        self.artifacts.open(artifact_name_from_locator(name))
    }

    /// Readiness probe. Never fails.
    pub fn health(&self) -> HealthReport {
        let model_loaded = self.engine.is_ready();
        HealthReport {
            status: if model_loaded {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            model_loaded,
            timestamp: Utc::now().to_rfc3339(),
            version: VERSION.to_string(),
        }
    }

    pub fn info(&self) -> ServiceInfo {
        let vocabulary = self.engine.vocabulary();
        ServiceInfo {
            app_name: APP_NAME.to_string(),
            version: VERSION.to_string(),
            model_loaded: self.engine.is_ready(),
            total_classes: vocabulary.map(|v| v.display_classes().len()).unwrap_or(0),
            total_categories: vocabulary
                .map(|v| v.atomic_categories().len())
                .unwrap_or(0),
            max_sequence_length: self.max_sequence_length,
            device: self.engine.device_name(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Raw class names the model emits, placeholders removed.
    pub fn classes(&self) -> Result<Vec<String>, ClassifierError> {
        Ok(self.ready_vocabulary()?.display_classes())
    }

    /// Distinct atomic categories, sorted.
    pub fn categories(&self) -> Result<Vec<String>, ClassifierError> {
        Ok(self.ready_vocabulary()?.atomic_categories().to_vec())
    }
}
