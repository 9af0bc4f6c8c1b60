//! Batch evaluation and artifact retrieval handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::output::{
    output_json, percent, print_header, print_hint, print_kv, print_success, print_table,
    print_warning, BarProgress, OutputMode,
};
use crate::init::AppContext;
use crate::models::{BatchMetrics, BatchResponse, BatchTable};
use crate::services::ProgressReporter;

pub async fn handle_batch(
    ctx: &AppContext,
    file: &Path,
    threshold: Option<f32>,
    mode: OutputMode,
) -> Result<()> {
    let table = BatchTable::from_path(file)?;

    let progress: Arc<dyn ProgressReporter> = if mode == OutputMode::Json {
        Arc::new(BarProgress::hidden())
    } else {
        Arc::new(BarProgress::new(table.len()))
    };

    let response = ctx
        .service
        .evaluate_batch_with_progress(&table, threshold, progress)
        .await?;

    if mode == OutputMode::Json {
        output_json(&response);
        return Ok(());
    }

    print_batch_summary(&response);
    Ok(())
}

fn print_batch_summary(response: &BatchResponse) {
    print_header(&format!(
        "Batch: {} rows in {:.2}s",
        response.total_processed, response.processing_time_secs
    ));

    if response.failed_rows > 0 {
        print_warning(&format!(
            "{} rows could not be classified and were marked 'unknown'",
            response.failed_rows
        ));
    }

    match &response.metrics {
        Some(metrics) => print_metrics(metrics),
        None => print_hint("No labelled categories in this batch; metrics skipped."),
    }

    println!();
    print_success(&format!("Results: {}", response.download_locator.bold()));
}

fn print_metrics(metrics: &BatchMetrics) {
    print_kv("Samples", &metrics.total_samples.to_string());
    print_kv("Exact match", &percent(metrics.exact_match_ratio));
    print_kv("Hamming loss", &percent(metrics.hamming_loss));
    print_kv("Accuracy", &percent(metrics.accuracy));
    print_kv("Macro precision", &format!("{:.4}", metrics.precision));
    print_kv("Macro recall", &format!("{:.4}", metrics.recall));
    print_kv("Macro F1", &format!("{:.4}", metrics.f1_score));

    let rows = metrics
        .category_metrics
        .iter()
        .map(|(category, m)| {
            vec![
                category.clone(),
                format!("{:.4}", m.precision),
                format!("{:.4}", m.recall),
                format!("{:.4}", m.f1_score),
                m.support.to_string(),
            ]
        })
        .collect();

    println!();
    print_table(&["Category", "Precision", "Recall", "F1", "Support"], rows);
}

pub fn handle_fetch(
    ctx: &AppContext,
    name: &str,
    output: Option<&Path>,
    mode: OutputMode,
) -> Result<()> {
    let path = ctx.service.fetch_artifact(name)?;

    if let Some(dest) = output {
        std::fs::copy(&path, dest).with_context(|| {
            format!("Failed to copy {} to {}", path.display(), dest.display())
        })?;
        if mode == OutputMode::Json {
            output_json(&serde_json::json!({ "path": dest }));
        } else {
            print_success(&format!("Saved {}", dest.display()));
        }
        return Ok(());
    }

    if mode == OutputMode::Json {
        output_json(&serde_json::json!({ "path": path }));
        return Ok(());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    print!("{}", contents);
    Ok(())
}
