//! Label vocabulary: the ordered class list the model was trained to emit.
//!
//! Index position `i` corresponds to model output unit `i`. Placeholder slots
//! (`null`, `"NaN"`, blank strings, bare separators) are kept so that alignment survives, but
//! they never show up in any human-facing class list.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use tracing::info;

use crate::ClassifierError;

/// Separator joining co-occurring categories into a composite label.
pub const LABEL_SEPARATOR: char = '|';

/// Split a pipe-joined label string into its atomic categories.
///
/// Tokens are trimmed and empty tokens dropped. `"NaN"`, `"nan"` and the empty
/// string mean "no labels".
pub fn split_label_string(raw: &str) -> Vec<String> {
    if is_placeholder(raw) {
        return Vec::new();
    }
    raw.split(LABEL_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_placeholder(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "NaN" || trimmed == "nan"
}

/// Immutable, index-aligned label vocabulary.
#[derive(Debug, Clone)]
pub struct LabelVocabulary {
    /// Raw entries in model output order; `None` marks a placeholder slot.
    entries: Vec<Option<String>>,
    /// Atomic parts of each entry (empty for placeholders).
    parts: Vec<Vec<String>>,
    /// Sorted union of all atomic parts.
    atomic: Vec<String>,
}

impl LabelVocabulary {
    /// Load a vocabulary from a JSON array of strings (`label_encoder.json`).
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::Load(format!(
                "Failed to read label vocabulary {}: {}",
                path.display(),
                e
            ))
        })?;

        let vocabulary = Self::from_json(&contents).map_err(|e| match e {
            ClassifierError::Load(msg) => {
                ClassifierError::Load(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;

        info!(
            "Label vocabulary loaded from {} ({} output units, {} categories)",
            path.display(),
            vocabulary.len(),
            vocabulary.atomic_categories().len()
        );
        Ok(vocabulary)
    }

    /// Parse a vocabulary from JSON text.
    ///
    /// Accepts the bare `NaN` tokens Python's `json` module emits for float NaN.
    pub fn from_json(contents: &str) -> Result<Self, ClassifierError> {
        let value: serde_json::Value = match serde_json::from_str(contents) {
            Ok(value) => value,
            Err(first) => serde_json::from_str(&replace_bare_nan(contents)).map_err(|_| {
                ClassifierError::Load(format!("Malformed label vocabulary: {}", first))
            })?,
        };

        let items = value.as_array().ok_or_else(|| {
            ClassifierError::Load("Malformed label vocabulary: expected a JSON array".to_string())
        })?;

        let entries = items
            .iter()
            .enumerate()
            .map(|(idx, item)| match item {
                serde_json::Value::Null => Ok(None),
                serde_json::Value::String(s) => Ok(Some(s.clone())),
                other => Err(ClassifierError::Load(format!(
                    "Malformed label vocabulary: entry {} is {}, expected string or null",
                    idx, other
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_entries(entries)
    }

    /// Build a vocabulary from raw entries, preserving index order.
    pub fn from_entries(entries: Vec<Option<String>>) -> Result<Self, ClassifierError> {
        if entries.is_empty() {
            return Err(ClassifierError::Load("Label vocabulary is empty".to_string()));
        }

        let entries: Vec<Option<String>> = entries
            .into_iter()
            .map(|entry| entry.filter(|s| !split_label_string(s).is_empty()))
            .collect();

        let mut seen = HashSet::new();
        for entry in entries.iter().flatten() {
            if !seen.insert(entry.as_str()) {
                return Err(ClassifierError::Load(format!(
                    "Label vocabulary contains duplicate entry '{}'",
                    entry
                )));
            }
        }

        let parts: Vec<Vec<String>> = entries
            .iter()
            .map(|entry| entry.as_deref().map(split_label_string).unwrap_or_default())
            .collect();

        let atomic: Vec<String> = parts
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if atomic.is_empty() {
            return Err(ClassifierError::Load(
                "Label vocabulary has no usable entries (all placeholders)".to_string(),
            ));
        }

        Ok(Self {
            entries,
            parts,
            atomic,
        })
    }

    /// Number of model output units (placeholders included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw entry at `index`, `None` for placeholder slots or out of range.
    pub fn entry(&self, index: usize) -> Option<&str> {
        self.entries.get(index).and_then(|e| e.as_deref())
    }

    /// Atomic categories encoded by the entry at `index`.
    pub fn parts(&self, index: usize) -> &[String] {
        self.parts.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_placeholder(&self, index: usize) -> bool {
        self.parts(index).is_empty()
    }

    /// Non-placeholder raw entries in index order.
    pub fn display_classes(&self) -> Vec<String> {
        self.entries.iter().flatten().cloned().collect()
    }

    /// Sorted, deduplicated atomic category names.
    pub fn atomic_categories(&self) -> &[String] {
        &self.atomic
    }
}

/// Replace `NaN` tokens that appear outside JSON strings with `null`.
fn replace_bare_nan(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if rest.starts_with("NaN") {
            out.push_str("null");
            rest = &rest[3..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}
