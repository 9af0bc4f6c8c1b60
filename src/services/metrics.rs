//! Multilabel metrics over parallel collections of label sets.
//!
//! Each row is binarized over a fixed category universe; per-category
//! confusion counts drive precision/recall/F1, and the same bits drive
//! Hamming loss.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{BatchMetrics, CategoryMetrics, ConfusionCounts};
use crate::ClassifierError;

/// Compute batch metrics for `true_sets[i]` vs `pred_sets[i]`.
///
/// Macro averages are unweighted over `universe`, so a category with zero
/// support contributes zeros. Exact match compares whole sets.
pub fn compute_metrics(
    true_sets: &[BTreeSet<String>],
    pred_sets: &[BTreeSet<String>],
    universe: &[String],
) -> Result<BatchMetrics, ClassifierError> {
    compute_metrics_with_failures(true_sets, pred_sets, &vec![false; true_sets.len()], universe)
}

/// Like [`compute_metrics`], but rows flagged in `failed` never count as an
/// exact match, even when both of their sets are empty.
pub fn compute_metrics_with_failures(
    true_sets: &[BTreeSet<String>],
    pred_sets: &[BTreeSet<String>],
    failed: &[bool],
    universe: &[String],
) -> Result<BatchMetrics, ClassifierError> {
    if true_sets.len() != pred_sets.len() || true_sets.len() != failed.len() {
        return Err(ClassifierError::Validation(format!(
            "Ground truth has {} rows but predictions have {} ({} failure flags)",
            true_sets.len(),
            pred_sets.len(),
            failed.len()
        )));
    }
    if true_sets.is_empty() {
        return Err(ClassifierError::Validation(
            "Cannot compute metrics over zero rows".to_string(),
        ));
    }

    let universe: BTreeSet<&String> = universe.iter().collect();
    if universe.is_empty() {
        return Err(ClassifierError::Validation(
            "Cannot compute metrics over an empty category universe".to_string(),
        ));
    }

    let total_samples = true_sets.len();

    let mut confusion: BTreeMap<&String, ConfusionCounts> = universe
        .iter()
        .map(|&category| (category, ConfusionCounts::default()))
        .collect();
    for (truth, predicted) in true_sets.iter().zip(pred_sets) {
        for (category, counts) in confusion.iter_mut() {
            counts.record(truth.contains(*category), predicted.contains(*category));
        }
    }

    let category_metrics: BTreeMap<String, CategoryMetrics> = confusion
        .iter()
        .map(|(&category, &counts)| (category.clone(), CategoryMetrics::from(counts)))
        .collect();

    let n_categories = category_metrics.len() as f64;
    let macro_avg = |pick: fn(&CategoryMetrics) -> f64| {
        category_metrics.values().map(pick).sum::<f64>() / n_categories
    };
    let precision = macro_avg(|m| m.precision);
    let recall = macro_avg(|m| m.recall);
    let f1_score = macro_avg(|m| m.f1_score);

    let mismatched_bits: usize = confusion.values().map(ConfusionCounts::mismatches).sum();
    let hamming_loss = mismatched_bits as f64 / (total_samples as f64 * n_categories);

    let exact_matches = true_sets
        .iter()
        .zip(pred_sets)
        .zip(failed)
        .filter(|((truth, predicted), failed)| !**failed && truth == predicted)
        .count();
    let exact_match_ratio = exact_matches as f64 / total_samples as f64;

    Ok(BatchMetrics {
        accuracy: 1.0 - hamming_loss,
        precision,
        recall,
        f1_score,
        hamming_loss,
        exact_match_ratio,
        total_samples,
        category_metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(labels: &[&str]) -> BTreeSet<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn universe(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_perfect_predictions() {
        let truth = vec![set(&["a"]), set(&["a", "b"]), set(&["c"])];
        let metrics = compute_metrics(&truth, &truth, &universe(&["a", "b", "c"])).unwrap();
        assert_eq!(metrics.exact_match_ratio, 1.0);
        assert_eq!(metrics.hamming_loss, 0.0);
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1_score, 1.0);
    }

    #[test]
    fn test_empty_predictions_give_zero_recall() {
        let truth = vec![set(&["a"]), set(&["b"]), set(&["a", "b"])];
        let preds = vec![set(&[]), set(&[]), set(&[])];
        let metrics = compute_metrics(&truth, &preds, &universe(&["a", "b"])).unwrap();
        for m in metrics.category_metrics.values() {
            assert_eq!(m.recall, 0.0);
            assert_eq!(m.precision, 0.0);
        }
        assert_eq!(metrics.exact_match_ratio, 0.0);
    }

    #[test]
    fn test_hamming_loss_counts_mismatched_bits() {
        // Universe {a, b}, 2 rows -> 4 bits. Row 1 misses b, row 2 adds a.
        let truth = vec![set(&["a", "b"]), set(&["b"])];
        let preds = vec![set(&["a"]), set(&["a", "b"])];
        let metrics = compute_metrics(&truth, &preds, &universe(&["a", "b"])).unwrap();
        assert_eq!(metrics.hamming_loss, 0.5);
        assert_eq!(metrics.accuracy, 0.5);
        assert_eq!(metrics.exact_match_ratio, 0.0);
    }

    #[test]
    fn test_per_category_scores() {
        let truth = vec![set(&["a"]), set(&["a"]), set(&["b"]), set(&[])];
        let preds = vec![set(&["a"]), set(&["b"]), set(&["b"]), set(&["a"])];
        let metrics = compute_metrics(&truth, &preds, &universe(&["a", "b"])).unwrap();

        let a = &metrics.category_metrics["a"];
        assert_eq!(
            a.confusion,
            ConfusionCounts {
                tp: 1,
                fp: 1,
                fn_: 1,
                tn: 1
            }
        );
        assert_eq!(a.precision, 0.5);
        assert_eq!(a.recall, 0.5);
        assert_eq!(a.support, 2);

        let b = &metrics.category_metrics["b"];
        assert_eq!(b.precision, 0.5);
        assert_eq!(b.recall, 1.0);
        assert_eq!(b.support, 1);

        assert_eq!(metrics.precision, 0.5);
        assert_eq!(metrics.recall, 0.75);
    }

    #[test]
    fn test_zero_support_category_drags_macro_average() {
        let truth = vec![set(&["a"]), set(&["a"])];
        let metrics = compute_metrics(&truth, &truth, &universe(&["a", "b"])).unwrap();
        let b = &metrics.category_metrics["b"];
        assert_eq!((b.precision, b.recall, b.f1_score, b.support), (0.0, 0.0, 0.0, 0));
        assert_eq!(metrics.f1_score, 0.5);
        assert_eq!(metrics.exact_match_ratio, 1.0);
    }

    #[test]
    fn test_exact_match_is_set_equality() {
        let truth = vec![set(&["b", "a"])];
        let preds = vec![set(&["a", "b", "a"])];
        let metrics = compute_metrics(&truth, &preds, &universe(&["a", "b"])).unwrap();
        assert_eq!(metrics.exact_match_ratio, 1.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = compute_metrics(&[set(&["a"])], &[], &universe(&["a"]));
        assert!(matches!(result, Err(ClassifierError::Validation(_))));
    }

    #[test]
    fn test_failed_rows_never_match_exactly() {
        let truth = vec![set(&["a"]), set(&[]), set(&["b"])];
        let preds = vec![set(&["a"]), set(&[]), set(&["b"])];
        let metrics =
            compute_metrics_with_failures(&truth, &preds, &[false, true, false], &universe(&["a", "b"]))
                .unwrap();
        assert!((metrics.exact_match_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.hamming_loss, 0.0);
    }

    #[test]
    fn test_failure_flags_length_checked() {
        let result = compute_metrics_with_failures(&[set(&["a"])], &[set(&["a"])], &[], &universe(&["a"]));
        assert!(matches!(result, Err(ClassifierError::Validation(_))));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(compute_metrics(&[], &[], &universe(&["a"])).is_err());
        assert!(compute_metrics(&[set(&["a"])], &[set(&["a"])], &[]).is_err());
    }

    #[test]
    fn test_duplicate_universe_entries_collapse() {
        let truth = vec![set(&["a"])];
        let metrics = compute_metrics(&truth, &truth, &universe(&["a", "a"])).unwrap();
        assert_eq!(metrics.category_metrics.len(), 1);
        assert_eq!(metrics.hamming_loss, 0.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn label_set() -> impl Strategy<Value = BTreeSet<String>> {
            (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(a, b, c)| {
                [("a", a), ("b", b), ("c", c)]
                    .into_iter()
                    .filter(|(_, present)| *present)
                    .map(|(label, _)| label.to_string())
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn prop_identical_sets_score_perfectly(
                rows in proptest::collection::vec(label_set(), 1..20),
            ) {
                let metrics = compute_metrics(&rows, &rows, &universe(&["a", "b", "c"])).unwrap();
                prop_assert_eq!(metrics.exact_match_ratio, 1.0);
                prop_assert_eq!(metrics.hamming_loss, 0.0);
            }

            #[test]
            fn prop_hamming_loss_in_unit_interval(
                truth in proptest::collection::vec(label_set(), 5),
                preds in proptest::collection::vec(label_set(), 5),
            ) {
                let metrics = compute_metrics(&truth, &preds, &universe(&["a", "b", "c"])).unwrap();
                prop_assert!((0.0..=1.0).contains(&metrics.hamming_loss));
                prop_assert!((0.0..=1.0).contains(&metrics.exact_match_ratio));
            }
        }
    }
}
