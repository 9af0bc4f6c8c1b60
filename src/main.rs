//! medlabel - multilabel classification of scientific abstracts
//!
//! Usage:
//!   medlabel predict "title abstract..."   Classify one text
//!   medlabel batch papers.csv              Classify and score a labelled table
//!   medlabel fetch <name>                  Retrieve an annotated batch result
//!   medlabel health                        Readiness probe
//!   medlabel --help                        Show all commands

use anyhow::Result;
use clap::Parser;

use medlabel::cli::output::{print_error, OutputMode};
use medlabel::cli::Cli;
use medlabel::init::{AppContext, ModelOverrides};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medlabel=info".parse()?),
        )
        .init();

    let mode = OutputMode::from_json_flag(cli.json);
    let overrides = ModelOverrides {
        model_dir: cli.model_dir.clone(),
        labels: cli.labels.clone(),
    };

    let ctx = AppContext::new(cli.data_path.clone(), &overrides)?;

    if let Err(e) = medlabel::cli::execute(&cli.command, &ctx, mode).await {
        if mode == OutputMode::Json {
            let kind = e
                .downcast_ref::<medlabel::ClassifierError>()
                .map(|err| err.kind())
                .unwrap_or("error");
            eprintln!(
                "{}",
                serde_json::json!({ "error": kind, "message": e.to_string() })
            );
        } else {
            print_error(&format!("{:#}", e));
        }
        std::process::exit(1);
    }

    Ok(())
}
