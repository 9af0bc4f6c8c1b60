//! Inference engine: validated single-text classification.
//!
//! Wraps a [`ClassifierBackend`] and the [`LabelVocabulary`] it was trained
//! with. Model calls are synchronous and run on the blocking pool when
//! invoked through [`InferenceEngine::predict`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{validate_threshold, ClassifierConfig};
use crate::inference::{decode_probabilities, ClassifierBackend};
use crate::models::PredictionResult;
use crate::vocabulary::LabelVocabulary;
use crate::ClassifierError;

/// Accepted character counts for a single prediction, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLimits {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            min_chars: 10,
            max_chars: 5000,
        }
    }
}

impl From<&ClassifierConfig> for TextLimits {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            min_chars: config.min_text_chars,
            max_chars: config.max_text_chars,
        }
    }
}

/// The loaded model plus its label vocabulary.
///
/// Both are `None` when loading failed at startup; every prediction then
/// reports [`ClassifierError::NotReady`] carrying the load failure.
#[derive(Clone)]
pub struct InferenceEngine {
    backend: Option<Arc<dyn ClassifierBackend>>,
    vocabulary: Option<Arc<LabelVocabulary>>,
    limits: TextLimits,
    load_error: Option<String>,
}

impl InferenceEngine {
    /// Pair a backend with its vocabulary.
    ///
    /// Fails with [`ClassifierError::Load`] when the model's output width
    /// differs from the vocabulary size.
    pub fn new(
        backend: Arc<dyn ClassifierBackend>,
        vocabulary: Arc<LabelVocabulary>,
        limits: TextLimits,
    ) -> Result<Self, ClassifierError> {
        if backend.num_labels() != vocabulary.len() {
            return Err(ClassifierError::Load(format!(
                "Model emits {} scores but the label vocabulary has {} entries",
                backend.num_labels(),
                vocabulary.len()
            )));
        }
        info!(
            "Inference engine ready ({} labels, {} categories, device {})",
            vocabulary.len(),
            vocabulary.atomic_categories().len(),
            backend.device_name()
        );
        Ok(Self {
            backend: Some(backend),
            vocabulary: Some(vocabulary),
            limits,
            load_error: None,
        })
    }

    /// Engine with nothing loaded.
    pub fn unavailable(limits: TextLimits) -> Self {
        Self {
            backend: None,
            vocabulary: None,
            limits,
            load_error: None,
        }
    }

    /// Record why loading failed, for later `NotReady` errors.
    pub fn with_load_error(mut self, error: impl Into<String>) -> Self {
        self.load_error = Some(error.into());
        self
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The error returned while nothing is loaded.
    pub fn not_ready(&self) -> ClassifierError {
        match &self.load_error {
            Some(cause) => {
                ClassifierError::NotReady(format!("Classifier model is not loaded: {}", cause))
            }
            None => ClassifierError::NotReady("Classifier model is not loaded".to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some() && self.vocabulary.is_some()
    }

    pub fn limits(&self) -> TextLimits {
        self.limits
    }

    pub fn vocabulary(&self) -> Option<&Arc<LabelVocabulary>> {
        self.vocabulary.as_ref()
    }

    pub fn device_name(&self) -> String {
        self.backend
            .as_ref()
            .map(|b| b.device_name())
            .unwrap_or_else(|| "none".to_string())
    }

    /// Check text length (in characters) and threshold range.
    pub fn validate(&self, text: &str, threshold: f32) -> Result<(), ClassifierError> {
        let chars = text.chars().count();
        if chars < self.limits.min_chars {
            return Err(ClassifierError::Validation(format!(
                "Text must be at least {} characters, got {}",
                self.limits.min_chars, chars
            )));
        }
        if chars > self.limits.max_chars {
            return Err(ClassifierError::Validation(format!(
                "Text must be at most {} characters, got {}",
                self.limits.max_chars, chars
            )));
        }
        validate_threshold(threshold)
    }

    fn loaded(
        &self,
    ) -> Result<(Arc<dyn ClassifierBackend>, Arc<LabelVocabulary>), ClassifierError> {
        match (&self.backend, &self.vocabulary) {
            (Some(backend), Some(vocabulary)) => Ok((backend.clone(), vocabulary.clone())),
            _ => Err(self.not_ready()),
        }
    }

    /// Classify one text on the calling thread.
    ///
    /// Text length is not checked; long inputs rely on tokenizer truncation.
    pub fn classify(&self, text: &str, threshold: f32) -> Result<PredictionResult, ClassifierError> {
        validate_threshold(threshold)?;
        let (backend, vocabulary) = self.loaded()?;
        run_model(backend.as_ref(), &vocabulary, text, threshold)
    }

    /// Validate and classify one text on the blocking pool.
    pub async fn predict(
        &self,
        text: &str,
        threshold: f32,
    ) -> Result<PredictionResult, ClassifierError> {
        self.validate(text, threshold)?;
        self.infer(text, threshold).await
    }

    /// Classify one text on the blocking pool without the length check.
    ///
    /// Batch rows take this path.
    pub async fn infer(
        &self,
        text: &str,
        threshold: f32,
    ) -> Result<PredictionResult, ClassifierError> {
        validate_threshold(threshold)?;
        let (backend, vocabulary) = self.loaded()?;

        let text_owned = text.to_string();
        tokio::task::spawn_blocking(move || {
            run_model(backend.as_ref(), &vocabulary, &text_owned, threshold)
        })
        .await
        .map_err(|e| ClassifierError::Inference(format!("Task join error: {}", e)))?
    }
}

fn run_model(
    backend: &dyn ClassifierBackend,
    vocabulary: &LabelVocabulary,
    text: &str,
    threshold: f32,
) -> Result<PredictionResult, ClassifierError> {
    let probabilities = backend.probabilities(text).map_err(|e| {
        warn!("Model call failed: {:#}", e);
        ClassifierError::Inference(format!("{:#}", e))
    })?;
    let result = decode_probabilities(&probabilities, vocabulary, threshold)?;
    debug!(
        "Classified {} chars as '{}' ({:.3})",
        text.chars().count(),
        result.predicted_class(),
        result.confidence()
    );
    Ok(result)
}
