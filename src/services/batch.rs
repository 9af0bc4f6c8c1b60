//! Batch evaluation: classify every row of a table and score the
//! predictions against the ground-truth `group` column.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::validate_threshold;
use crate::models::{AnnotatedRow, BatchMetrics, BatchTable, PredictionResult, UNKNOWN_CATEGORY};
use crate::services::classifier::InferenceEngine;
use crate::services::metrics::compute_metrics_with_failures;
use crate::services::progress::ProgressReporter;
use crate::vocabulary::split_label_string;
use crate::ClassifierError;

/// Per-row annotations plus aggregate metrics.
#[derive(Debug, Clone)]
pub struct BatchEvaluation {
    /// One entry per input row, in input order.
    pub rows: Vec<AnnotatedRow>,
    /// `None` when no category appears in either truth or predictions.
    pub metrics: Option<BatchMetrics>,
    pub failed_rows: usize,
}

impl BatchEvaluation {
    pub fn total_processed(&self) -> usize {
        self.rows.len()
    }
}

pub struct BatchEvaluator {
    engine: InferenceEngine,
    progress: Arc<dyn ProgressReporter>,
}

impl BatchEvaluator {
    pub fn new(engine: InferenceEngine, progress: Arc<dyn ProgressReporter>) -> Self {
        Self { engine, progress }
    }

    /// Classify every row sequentially, then compute metrics.
    ///
    /// A row whose inference fails is annotated with the `unknown` sentinel
    /// and the batch continues. `unknown` never enters metrics.
    pub async fn evaluate(
        &self,
        table: &BatchTable,
        threshold: f32,
    ) -> Result<BatchEvaluation, ClassifierError> {
        validate_threshold(threshold)?;
        if !self.engine.is_ready() {
            return Err(self.engine.not_ready());
        }

        let total = table.len();
        info!("Evaluating batch of {} rows (threshold {})", total, threshold);

        let mut annotated = Vec::with_capacity(total);
        let mut true_sets = Vec::with_capacity(total);
        let mut pred_sets = Vec::with_capacity(total);
        let mut failures = Vec::with_capacity(total);

        for (idx, row) in table.rows().enumerate() {
            let (result, failed) = match self.engine.infer(&row.text(), threshold).await {
                Ok(result) => (result, false),
                Err(e) => {
                    warn!("Row {} failed, annotating as '{}': {}", idx + 1, UNKNOWN_CATEGORY, e);
                    (PredictionResult::unknown(), true)
                }
            };
            failures.push(failed);

            annotated.push(AnnotatedRow {
                predicted_labels: result.predicted_class(),
                confidence: result.confidence(),
                failed,
            });
            true_sets.push(scored_set(split_label_string(&row.true_labels)));
            pred_sets.push(scored_set(result.categories()));

            self.progress.report(idx + 1, total, None).await;
        }

        let failed_rows = failures.iter().filter(|&&failed| failed).count();
        let metrics = self.score(&true_sets, &pred_sets, &failures)?;
        self.progress
            .finish(&format!("{} rows, {} failed", total, failed_rows))
            .await;

        info!(
            "Batch complete: {} rows, {} failed, exact match {}",
            total,
            failed_rows,
            metrics
                .as_ref()
                .map(|m| format!("{:.3}", m.exact_match_ratio))
                .unwrap_or_else(|| "n/a".to_string())
        );

        Ok(BatchEvaluation {
            rows: annotated,
            metrics,
            failed_rows,
        })
    }

    /// Metrics over vocabulary categories plus any category seen in the batch.
    /// Failed rows never count as exact matches.
    fn score(
        &self,
        true_sets: &[BTreeSet<String>],
        pred_sets: &[BTreeSet<String>],
        failures: &[bool],
    ) -> Result<Option<BatchMetrics>, ClassifierError> {
        let observed: BTreeSet<&String> = true_sets.iter().chain(pred_sets).flatten().collect();
        if observed.is_empty() {
            info!("No categories in truth or predictions, skipping metrics");
            return Ok(None);
        }

        let mut universe: BTreeSet<String> = observed.into_iter().cloned().collect();
        if let Some(vocabulary) = self.engine.vocabulary() {
            universe.extend(vocabulary.atomic_categories().iter().cloned());
        }
        let universe: Vec<String> = universe.into_iter().collect();

        compute_metrics_with_failures(true_sets, pred_sets, failures, &universe).map(Some)
    }
}

/// Label set as scored: the `unknown` sentinel is dropped.
fn scored_set(labels: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    labels
        .into_iter()
        .filter(|label| label != UNKNOWN_CATEGORY)
        .collect()
}
