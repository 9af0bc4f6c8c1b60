//! Tabular batch input and annotated output.
//!
//! Input tables must carry `title`, `abstract` and `group` columns. Every
//! other column is preserved and written back after the annotated ones, except
//! stale `group_predicted`/`confidence` columns, which are replaced.

use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::models::metrics::BatchMetrics;
use crate::models::prediction::compose_text;
use crate::ClassifierError;

pub const TITLE_COLUMN: &str = "title";
pub const ABSTRACT_COLUMN: &str = "abstract";
pub const GROUP_COLUMN: &str = "group";
pub const PREDICTED_COLUMN: &str = "group_predicted";
pub const CONFIDENCE_COLUMN: &str = "confidence";

const REQUIRED_COLUMNS: [&str; 3] = [TITLE_COLUMN, ABSTRACT_COLUMN, GROUP_COLUMN];

/// One input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    pub title: String,
    pub abstract_text: String,
    /// Pipe-joined ground truth; empty or `NaN` means no labels.
    pub true_labels: String,
}

impl BatchRow {
    pub fn new(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        true_labels: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            true_labels: true_labels.into(),
        }
    }

    /// Model input: `title + " " + abstract`.
    pub fn text(&self) -> String {
        compose_text(&self.title, &self.abstract_text)
    }
}

/// Fields the evaluator derives for each row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRow {
    /// Sorted predicted categories joined by `|`.
    pub predicted_labels: String,
    pub confidence: f32,
    /// Whether inference failed and the `unknown` sentinel was substituted.
    pub failed: bool,
}

/// A parsed CSV table with the required columns located.
#[derive(Debug, Clone)]
pub struct BatchTable {
    headers: StringRecord,
    records: Vec<StringRecord>,
    title_idx: usize,
    abstract_idx: usize,
    group_idx: usize,
}

impl BatchTable {
    pub fn from_path(path: &Path) -> Result<Self, ClassifierError> {
        let file = std::fs::File::open(path).map_err(|e| {
            ClassifierError::Validation(format!("Failed to open table {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    /// Parse CSV, rejecting tables without `title`, `abstract` and `group`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ClassifierError> {
        let mut reader = ReaderBuilder::new().from_reader(reader);

        let headers = reader.headers()?.clone();
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let (Some(title_idx), Some(abstract_idx), Some(group_idx)) = (
            position(TITLE_COLUMN),
            position(ABSTRACT_COLUMN),
            position(GROUP_COLUMN),
        ) else {
            let missing: Vec<&str> = REQUIRED_COLUMNS
                .iter()
                .copied()
                .filter(|name| position(*name).is_none())
                .collect();
            return Err(ClassifierError::Validation(format!(
                "Table is missing required columns: {}",
                missing.join(", ")
            )));
        };

        let records = reader
            .records()
            .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

        Ok(Self {
            headers,
            records,
            title_idx,
            abstract_idx,
            group_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows in input order.
    pub fn rows(&self) -> impl Iterator<Item = BatchRow> + '_ {
        self.records.iter().map(|record| {
            let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
            BatchRow {
                title: field(self.title_idx),
                abstract_text: field(self.abstract_idx),
                true_labels: field(self.group_idx),
            }
        })
    }

    /// Write the table with annotations, leading with
    /// `title, abstract, group, group_predicted, confidence`.
    pub fn write_annotated<W: Write>(
        &self,
        writer: W,
        annotated: &[AnnotatedRow],
    ) -> Result<(), ClassifierError> {
        if annotated.len() != self.records.len() {
            return Err(ClassifierError::Validation(format!(
                "Expected {} annotated rows, got {}",
                self.records.len(),
                annotated.len()
            )));
        }

        let leading = [self.title_idx, self.abstract_idx, self.group_idx];
        let trailing: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| {
                let name = name.trim();
                !leading.contains(idx) && name != PREDICTED_COLUMN && name != CONFIDENCE_COLUMN
            })
            .map(|(idx, _)| idx)
            .collect();

        let mut out = WriterBuilder::new().from_writer(writer);
        let write_err = |e: csv::Error| ClassifierError::Artifact {
            message: format!("Failed to write annotated table: {}", e),
            source: None,
        };

        let mut header: Vec<&str> = vec![TITLE_COLUMN, ABSTRACT_COLUMN, GROUP_COLUMN];
        header.extend([PREDICTED_COLUMN, CONFIDENCE_COLUMN]);
        header.extend(trailing.iter().map(|&idx| self.headers.get(idx).unwrap_or_default()));
        out.write_record(&header).map_err(write_err)?;

        for (record, row) in self.records.iter().zip(annotated) {
            let confidence = format!("{:.4}", row.confidence);
            let mut fields: Vec<&str> = leading
                .iter()
                .map(|&idx| record.get(idx).unwrap_or_default())
                .collect();
            fields.push(&row.predicted_labels);
            fields.push(&confidence);
            fields.extend(trailing.iter().map(|&idx| record.get(idx).unwrap_or_default()));
            out.write_record(&fields).map_err(write_err)?;
        }

        out.flush()
            .map_err(|e| ClassifierError::artifact("Failed to flush annotated table", e))?;
        Ok(())
    }
}

/// Result of evaluating a batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    pub total_processed: usize,
    /// Rows whose inference failed and were annotated as `unknown`.
    pub failed_rows: usize,
    pub processing_time_secs: f64,
    /// `None` when there was nothing to score.
    pub metrics: Option<BatchMetrics>,
    pub download_locator: String,
}
