//! Multilabel evaluation metric types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-category confusion counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tn: usize,
}

impl ConfusionCounts {
    /// Record one row's bit for this category.
    pub fn record(&mut self, truth: bool, predicted: bool) {
        match (truth, predicted) {
            (true, true) => self.tp += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
            (false, false) => self.tn += 1,
        }
    }

    /// TP / (TP + FP), 0 when undefined.
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// TP / (TP + FN), 0 when undefined.
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall, 0 when both are 0.
    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let denom = precision + recall;
        if denom == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / denom
    }

    /// Number of true occurrences.
    pub fn support(&self) -> usize {
        self.tp + self.fn_
    }

    /// Rows where truth and prediction disagree.
    pub fn mismatches(&self) -> usize {
        self.fp + self.fn_
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        return 0.0;
    }
    num as f64 / denom as f64
}

/// Precision/recall/F1/support for one atomic category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
    pub confusion: ConfusionCounts,
}

impl From<ConfusionCounts> for CategoryMetrics {
    fn from(confusion: ConfusionCounts) -> Self {
        Self {
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1_score: confusion.f1_score(),
            support: confusion.support(),
            confusion,
        }
    }
}

/// Aggregate metrics over a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    /// `1 - hamming_loss`. An approximation, not subset or Jaccard accuracy.
    pub accuracy: f64,
    /// Macro-averaged precision.
    pub precision: f64,
    /// Macro-averaged recall.
    pub recall: f64,
    /// Macro-averaged F1.
    pub f1_score: f64,
    pub hamming_loss: f64,
    pub exact_match_ratio: f64,
    pub total_samples: usize,
    pub category_metrics: BTreeMap<String, CategoryMetrics>,
}
