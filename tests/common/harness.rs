//! Test harness wiring an `MlService` to a fake backend.
//!
//! Each harness owns a temporary data directory that holds the artifact
//! directory and is removed on drop.

use std::sync::Arc;

use tempfile::TempDir;

use medlabel::config::ClassifierConfig;
use medlabel::inference::ClassifierBackend;
use medlabel::init::AppContext;
use medlabel::services::{InferenceEngine, MlService, TextLimits};
use medlabel::vocabulary::LabelVocabulary;

pub struct TestHarness {
    pub ctx: AppContext,
    /// Kept alive while the harness exists
    pub temp_dir: TempDir,
}

impl TestHarness {
    /// Harness around `backend`, with a vocabulary built from `entries`
    /// (`None` marks a placeholder slot).
    pub fn new(backend: Arc<dyn ClassifierBackend>, entries: &[Option<&str>]) -> Self {
        let vocabulary = vocabulary(entries);
        let config = ClassifierConfig::default();
        let engine = InferenceEngine::new(backend, Arc::new(vocabulary), TextLimits::from(&config))
            .expect("backend width should match vocabulary");
        Self::with_engine(engine, config)
    }

    /// Harness whose model failed to load.
    pub fn unavailable() -> Self {
        let config = ClassifierConfig::default();
        let engine = InferenceEngine::unavailable(TextLimits::from(&config))
            .with_load_error("Load error: model directory not found");
        Self::with_engine(engine, config)
    }

    fn with_engine(engine: InferenceEngine, config: ClassifierConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ctx = AppContext::with_engine(temp_dir.path().to_path_buf(), config, engine);
        Self { ctx, temp_dir }
    }

    pub fn service(&self) -> &Arc<MlService> {
        &self.ctx.service
    }
}

pub fn vocabulary(entries: &[Option<&str>]) -> LabelVocabulary {
    LabelVocabulary::from_entries(entries.iter().map(|e| e.map(str::to_string)).collect())
        .expect("vocabulary should be valid")
}
