use thiserror::Error;

/// Custom error type for classifier operations.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Model, tokenizer or label vocabulary could not be loaded.
    #[error("Load error: {0}")]
    Load(String),

    /// Input validation failed (text bounds, threshold range, table shape).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single prediction failed inside the model runtime.
    #[error("Inference error: {0}")]
    Inference(String),

    /// The model is not loaded; callers should try again later.
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Requested resource was not found (or has expired).
    #[error("Not found: {kind} '{id}'")]
    NotFound { kind: String, id: String },

    /// Writing or reading a result artifact failed.
    #[error("Artifact error: {message}")]
    Artifact {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl ClassifierError {
    /// Stable snake_case tag, used in JSON error output.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierError::Load(_) => "load_error",
            ClassifierError::Validation(_) => "validation_error",
            ClassifierError::Inference(_) => "inference_error",
            ClassifierError::NotReady(_) => "not_ready",
            ClassifierError::NotFound { .. } => "not_found",
            ClassifierError::Artifact { .. } => "artifact_error",
        }
    }

    /// Whether a caller may reasonably retry the same request.
    ///
    /// Validation and not-ready errors are never retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClassifierError::Inference(_))
    }

    pub(crate) fn artifact(message: impl Into<String>, source: std::io::Error) -> Self {
        ClassifierError::Artifact {
            message: message.into(),
            source: Some(source),
        }
    }
}

impl From<csv::Error> for ClassifierError {
    fn from(err: csv::Error) -> Self {
        ClassifierError::Validation(format!("Malformed table: {}", err))
    }
}
