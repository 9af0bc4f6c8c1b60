//! Health, info and class listing handlers.

use anyhow::Result;
use colored::Colorize;

use crate::cli::output::{output_json, print_header, print_hint, print_kv, OutputMode};
use crate::init::AppContext;
use crate::models::HealthStatus;

pub fn handle_health(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    let report = ctx.service.health();

    if mode == OutputMode::Json {
        output_json(&report);
        return Ok(());
    }

    let status = match report.status {
        HealthStatus::Healthy => "healthy".green().bold(),
        HealthStatus::Degraded => "degraded".yellow().bold(),
    };
    print_header(&format!("Status: {}", status));
    print_kv("Model loaded", &report.model_loaded.to_string());
    print_kv("Version", &report.version);
    print_kv("Checked at", &report.timestamp);
    if !report.model_loaded {
        print_hint("Check --model-dir / --labels or classifier.toml in the data directory.");
    }
    Ok(())
}

pub fn handle_info(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    let info = ctx.service.info();

    if mode == OutputMode::Json {
        output_json(&info);
        return Ok(());
    }

    print_header(&format!("{} v{}", info.app_name, info.version));
    print_kv("Model loaded", &info.model_loaded.to_string());
    print_kv("Classes", &info.total_classes.to_string());
    print_kv("Categories", &info.total_categories.to_string());
    print_kv("Max sequence length", &info.max_sequence_length.to_string());
    print_kv("Device", &info.device);
    print_kv("Data path", &ctx.data_path.display().to_string());
    Ok(())
}

pub fn handle_classes(ctx: &AppContext, atomic: bool, mode: OutputMode) -> Result<()> {
    let names = if atomic {
        ctx.service.categories()?
    } else {
        ctx.service.classes()?
    };

    if mode == OutputMode::Json {
        output_json(&names);
        return Ok(());
    }

    let title = if atomic { "Categories" } else { "Classes" };
    print_header(&format!("{} ({})", title, names.len()));
    for name in &names {
        println!("  {}", name);
    }
    Ok(())
}
