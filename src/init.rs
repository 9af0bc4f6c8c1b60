//! Shared initialization logic for the CLI and embedders.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{load_config, ClassifierConfig, ModelSource};
use crate::inference::candle_backend::{download_model, select_device, BertMultiLabelClassifier};
use crate::inference::ModelFiles;
use crate::services::{InferenceEngine, MlService, TextLimits};
use crate::vocabulary::LabelVocabulary;
use crate::ClassifierError;

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Clone, Default)]
pub struct ModelOverrides {
    pub model_dir: Option<PathBuf>,
    pub labels: Option<PathBuf>,
}

impl ModelOverrides {
    pub fn apply(&self, config: &mut ClassifierConfig) {
        if let Some(dir) = &self.model_dir {
            config.model = ModelSource::Local { dir: dir.clone() };
        }
        if let Some(labels) = &self.labels {
            config.labels_path = Some(labels.clone());
        }
    }
}

/// Application context holding the configured service.
pub struct AppContext {
    pub data_path: PathBuf,
    pub config: ClassifierConfig,
    pub service: Arc<MlService>,
}

impl AppContext {
    /// Initialize application context.
    ///
    /// Data path priority: explicit path > MEDLABEL_DATA_PATH env > ./.medlabel (if exists) > ~/.medlabel
    ///
    /// A model that fails to load leaves the service degraded rather than
    /// aborting, so `health` and `info` still answer.
    pub fn new(explicit_path: Option<PathBuf>, overrides: &ModelOverrides) -> Result<Self> {
        let data_path = resolve_data_path(explicit_path);
        info!("Using data path: {}", data_path.display());

        let mut config = load_config(&data_path);
        overrides.apply(&mut config);
        config.validate()?;

        let engine = match load_engine(&config) {
            Ok(engine) => engine,
            Err(e) => {
                warn!(
                    "Failed to load classifier: {}. Predictions will be unavailable.",
                    e
                );
                InferenceEngine::unavailable(TextLimits::from(&config)).with_load_error(e.to_string())
            }
        };

        Ok(Self::with_engine(data_path, config, engine))
    }

    /// Context around an already-built engine.
    pub fn with_engine(data_path: PathBuf, config: ClassifierConfig, engine: InferenceEngine) -> Self {
        let artifact_dir = config.artifact_dir(&data_path);
        let service = Arc::new(MlService::with_artifact_dir(engine, artifact_dir, &config));
        Self {
            data_path,
            config,
            service,
        }
    }
}

pub fn resolve_data_path(explicit_path: Option<PathBuf>) -> PathBuf {
    explicit_path
        .or_else(|| std::env::var("MEDLABEL_DATA_PATH").ok().map(PathBuf::from))
        .or_else(|| {
            let local_path = Path::new(".medlabel");
            if local_path.exists() && local_path.is_dir() {
                Some(local_path.to_path_buf())
            } else {
                None
            }
        })
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".medlabel"))
                .unwrap_or_else(|| PathBuf::from(".medlabel"))
        })
}

/// Load vocabulary and model, failing with [`ClassifierError::Load`].
pub fn load_engine(config: &ClassifierConfig) -> Result<InferenceEngine, ClassifierError> {
    let files = match &config.model {
        ModelSource::Local { dir } => ModelFiles::from_dir(dir),
        ModelSource::Hub { repo } => download_model(repo),
    }
    .map_err(|e| ClassifierError::Load(format!("{:#}", e)))?;

    let labels_path = config
        .labels_path
        .clone()
        .or_else(|| files.labels_path.clone())
        .ok_or_else(|| {
            ClassifierError::Load(
                "No label vocabulary found; pass --labels or ship label_encoder.json with the model"
                    .to_string(),
            )
        })?;
    let vocabulary = LabelVocabulary::load(&labels_path)?;

    let device = select_device();
    let classifier = BertMultiLabelClassifier::new(
        &files,
        device,
        vocabulary.len(),
        config.max_sequence_length,
    )
    .map_err(|e| ClassifierError::Load(format!("{:#}", e)))?;

    InferenceEngine::new(
        Arc::new(classifier),
        Arc::new(vocabulary),
        TextLimits::from(config),
    )
}
