//! Single-text prediction types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::vocabulary::LABEL_SEPARATOR;

/// Category name used when a batch row could not be classified.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Outcome of one inference call. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    labels: BTreeSet<String>,
    probabilities: BTreeMap<String, f32>,
    confidence: f32,
}

impl PredictionResult {
    pub fn new(
        labels: BTreeSet<String>,
        probabilities: BTreeMap<String, f32>,
        confidence: f32,
    ) -> Self {
        Self {
            labels,
            probabilities,
            confidence,
        }
    }

    /// Sentinel result substituted for a row whose inference failed.
    pub fn unknown() -> Self {
        Self {
            labels: BTreeSet::from([UNKNOWN_CATEGORY.to_string()]),
            probabilities: BTreeMap::new(),
            confidence: 0.0,
        }
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    /// Selected categories in sorted order.
    pub fn categories(&self) -> Vec<String> {
        self.labels.iter().cloned().collect()
    }

    /// Sorted categories joined by `|`.
    pub fn predicted_class(&self) -> String {
        self.categories().join(LABEL_SEPARATOR.to_string().as_str())
    }

    /// Probability per atomic category.
    pub fn probabilities(&self) -> &BTreeMap<String, f32> {
        &self.probabilities
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Validated input of a single prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Title and abstract joined by a single space.
    pub text: String,
    /// Per-category cutoff; defaults to the configured threshold.
    #[serde(default)]
    pub threshold: Option<f32>,
}

impl PredictionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            threshold: None,
        }
    }

    /// Build the model input the way it was assembled at training time.
    pub fn from_parts(title: &str, abstract_text: &str) -> Self {
        Self::new(compose_text(title, abstract_text))
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Concatenate title and abstract with exactly one space.
pub fn compose_text(title: &str, abstract_text: &str) -> String {
    format!("{} {}", title, abstract_text)
}

/// Response of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Sorted categories joined by `|`, e.g. `cardiovascular|neurological`.
    pub predicted_class: String,
    pub confidence: f32,
    pub probabilities: BTreeMap<String, f32>,
    pub categories: Vec<String>,
}

impl From<&PredictionResult> for PredictionResponse {
    fn from(result: &PredictionResult) -> Self {
        Self {
            predicted_class: result.predicted_class(),
            confidence: result.confidence(),
            probabilities: result.probabilities().clone(),
            categories: result.categories(),
        }
    }
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self::from(&result)
    }
}
