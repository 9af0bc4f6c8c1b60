//! Model runtime for multilabel classification.
//!
//! The [`ClassifierBackend`] trait is the opaque "text in, probability vector
//! out" capability. [`candle_backend::BertMultiLabelClassifier`] implements it
//! with candle; tests substitute their own backends.

pub mod candle_backend;
pub mod decode;

pub use candle_backend::{BertMultiLabelClassifier, ModelFiles};
pub use decode::decode_probabilities;

/// Opaque model capability producing one independent probability per
/// vocabulary index.
pub trait ClassifierBackend: Send + Sync {
    /// Run tokenization and a forward pass for one text.
    ///
    /// Returns sigmoid-activated scores in `[0, 1]`, one per output unit.
    fn probabilities(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Number of output units the model emits.
    fn num_labels(&self) -> usize;

    /// Short description of the compute device, for status reporting.
    fn device_name(&self) -> String {
        "unknown".to_string()
    }
}
