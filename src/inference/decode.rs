//! Turn a probability vector into a thresholded label set.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::PredictionResult;
use crate::vocabulary::LabelVocabulary;
use crate::ClassifierError;

/// Decode per-index probabilities into a [`PredictionResult`].
///
/// Every non-placeholder index whose probability strictly exceeds `threshold`
/// is selected. If none does, the single highest-probability index is used
/// instead, so the label set is never empty. Confidence is the mean
/// probability of the selected indices.
///
/// The per-category probability map sums the probabilities of every
/// vocabulary entry containing that category, capped at 1.0. With composite
/// entries in the vocabulary a single selected category's map value can
/// therefore exceed the confidence; they agree for atomic-only vocabularies.
pub fn decode_probabilities(
    probabilities: &[f32],
    vocabulary: &LabelVocabulary,
    threshold: f32,
) -> Result<PredictionResult, ClassifierError> {
    if probabilities.len() != vocabulary.len() {
        return Err(ClassifierError::Inference(format!(
            "Model produced {} scores but the vocabulary has {} entries",
            probabilities.len(),
            vocabulary.len()
        )));
    }
    if let Some(idx) = probabilities.iter().position(|p| !p.is_finite()) {
        return Err(ClassifierError::Inference(format!(
            "Model produced a non-finite score at index {}",
            idx
        )));
    }

    let candidates: Vec<usize> = (0..vocabulary.len())
        .filter(|&idx| !vocabulary.is_placeholder(idx))
        .collect();

    let mut selected: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&idx| probabilities[idx] > threshold)
        .collect();

    if selected.is_empty() {
        let best = candidates
            .iter()
            .copied()
            .max_by(|&a, &b| {
                probabilities[a]
                    .partial_cmp(&probabilities[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| {
                ClassifierError::Inference("Vocabulary has no selectable labels".to_string())
            })?;
        selected.push(best);
    }

    let labels: BTreeSet<String> = selected
        .iter()
        .flat_map(|&idx| vocabulary.parts(idx).iter().cloned())
        .collect();

    let confidence = (selected.iter().map(|&idx| probabilities[idx]).sum::<f32>()
        / selected.len() as f32)
        .clamp(0.0, 1.0);

    let mut category_probabilities: BTreeMap<String, f32> = vocabulary
        .atomic_categories()
        .iter()
        .map(|category| (category.clone(), 0.0))
        .collect();
    for &idx in &candidates {
        for category in vocabulary.parts(idx) {
            if let Some(total) = category_probabilities.get_mut(category) {
                *total += probabilities[idx];
            }
        }
    }
    for total in category_probabilities.values_mut() {
        *total = total.clamp(0.0, 1.0);
    }

    Ok(PredictionResult::new(labels, category_probabilities, confidence))
}
