//! Deterministic `ClassifierBackend` doubles.

use std::sync::atomic::{AtomicUsize, Ordering};

use medlabel::inference::ClassifierBackend;

/// Returns the same scores for every text.
pub struct FixedBackend {
    scores: Vec<f32>,
}

impl FixedBackend {
    pub fn new(scores: Vec<f32>) -> Self {
        Self { scores }
    }
}

impl ClassifierBackend for FixedBackend {
    fn probabilities(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.scores.clone())
    }

    fn num_labels(&self) -> usize {
        self.scores.len()
    }

    fn device_name(&self) -> String {
        "test".to_string()
    }
}

/// Scores 0.9 for every label whose name occurs in the text, 0.1 otherwise.
pub struct KeywordBackend {
    labels: Vec<String>,
}

impl KeywordBackend {
    pub fn new(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ClassifierBackend for KeywordBackend {
    fn probabilities(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let text = text.to_lowercase();
        Ok(self
            .labels
            .iter()
            .map(|label| if text.contains(label.as_str()) { 0.9 } else { 0.1 })
            .collect())
    }

    fn num_labels(&self) -> usize {
        self.labels.len()
    }
}

/// Fails for texts containing `marker`, otherwise behaves like [`FixedBackend`].
pub struct FailingBackend {
    marker: String,
    inner: FixedBackend,
}

impl FailingBackend {
    pub fn new(marker: &str, scores: Vec<f32>) -> Self {
        Self {
            marker: marker.to_string(),
            inner: FixedBackend::new(scores),
        }
    }
}

impl ClassifierBackend for FailingBackend {
    fn probabilities(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        if text.contains(&self.marker) {
            anyhow::bail!("simulated runtime failure");
        }
        self.inner.probabilities(text)
    }

    fn num_labels(&self) -> usize {
        self.inner.num_labels()
    }
}

/// Counts model calls.
pub struct CountingBackend {
    inner: FixedBackend,
    calls: AtomicUsize,
}

impl CountingBackend {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            inner: FixedBackend::new(scores),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClassifierBackend for CountingBackend {
    fn probabilities(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.probabilities(text)
    }

    fn num_labels(&self) -> usize {
        self.inner.num_labels()
    }
}
