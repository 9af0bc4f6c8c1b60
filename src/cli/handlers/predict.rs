//! Single-text prediction handler.

use anyhow::Result;
use colored::Colorize;

use crate::cli::output::{output_json, print_header, print_kv, print_table, OutputMode};
use crate::init::AppContext;
use crate::models::{PredictionRequest, PredictionResponse};

pub async fn handle_predict(
    ctx: &AppContext,
    text: String,
    threshold: Option<f32>,
    mode: OutputMode,
) -> Result<()> {
    let mut request = PredictionRequest::new(text);
    if let Some(threshold) = threshold {
        request = request.with_threshold(threshold);
    }

    let response = ctx.service.predict(request).await?;

    if mode == OutputMode::Json {
        output_json(&response);
        return Ok(());
    }

    print_prediction(&response);
    Ok(())
}

fn print_prediction(response: &PredictionResponse) {
    print_header(&format!("Prediction: {}", response.predicted_class.green().bold()));
    print_kv("Confidence", &format!("{:.4}", response.confidence));
    print_kv("Categories", &response.categories.join(", "));

    let mut ranked: Vec<(&String, &f32)> = response.probabilities.iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));

    let rows = ranked
        .into_iter()
        .map(|(category, probability)| {
            let selected = if response.categories.contains(category) {
                "*"
            } else {
                ""
            };
            vec![
                category.clone(),
                format!("{:.4}", probability),
                selected.to_string(),
            ]
        })
        .collect();

    println!();
    print_table(&["Category", "Probability", "Selected"], rows);
}
