//! CLI interface for medlabel.

pub mod handlers;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use output::OutputMode;

/// medlabel - multilabel classification of scientific abstracts
#[derive(Parser)]
#[command(name = "medlabel", version, about, long_about = None)]
pub struct Cli {
    /// Override data directory (default: ~/.medlabel)
    #[arg(long, env = "MEDLABEL_DATA_PATH", global = true)]
    pub data_path: Option<PathBuf>,

    /// Load the model from this local directory
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    /// Label vocabulary file (default: label_encoder.json next to the model)
    #[arg(long, global = true)]
    pub labels: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify one text (or a title + abstract pair)
    Predict {
        /// Text to classify
        #[arg(required_unless_present_all = ["title", "abstract_text"])]
        text: Option<String>,
        /// Article title (combined with --abstract)
        #[arg(long, requires = "abstract_text", conflicts_with = "text")]
        title: Option<String>,
        /// Article abstract (combined with --title)
        #[arg(long = "abstract", requires = "title", conflicts_with = "text")]
        abstract_text: Option<String>,
        /// Per-category probability cutoff in [0, 1]
        #[arg(long)]
        threshold: Option<f32>,
    },

    /// Classify a CSV with title, abstract and group columns and score it
    Batch {
        /// Input CSV path
        file: PathBuf,
        /// Per-category probability cutoff in [0, 1]
        #[arg(long)]
        threshold: Option<f32>,
    },

    /// Retrieve an annotated batch result
    Fetch {
        /// Artifact name or download locator
        name: String,
        /// Copy the artifact here instead of printing it
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Readiness probe
    Health,

    /// Model and service status
    Info,

    /// List the classes the model emits
    Classes {
        /// List distinct atomic categories instead
        #[arg(long)]
        atomic: bool,
    },
}

/// Execute a CLI command.
pub async fn execute(
    command: &Commands,
    ctx: &crate::init::AppContext,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match command {
        Commands::Predict {
            text,
            title,
            abstract_text,
            threshold,
        } => {
            let text = match (text, title, abstract_text) {
                (Some(text), _, _) => text.clone(),
                (None, Some(title), Some(abstract_text)) => {
                    crate::models::compose_text(title, abstract_text)
                }
                _ => anyhow::bail!("Provide TEXT or both --title and --abstract"),
            };
            handlers::predict::handle_predict(ctx, text, *threshold, mode).await?
        }

        Commands::Batch { file, threshold } => {
            handlers::batch::handle_batch(ctx, file, *threshold, mode).await?
        }

        Commands::Fetch { name, output } => {
            handlers::batch::handle_fetch(ctx, name, output.as_deref(), mode)?
        }

        Commands::Health => handlers::system::handle_health(ctx, mode)?,

        Commands::Info => handlers::system::handle_info(ctx, mode)?,

        Commands::Classes { atomic } => handlers::system::handle_classes(ctx, *atomic, mode)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_predict_text() {
        let cli = Cli::try_parse_from(["medlabel", "predict", "Cardiac outcomes", "--threshold", "0.3"])
            .unwrap();
        match cli.command {
            Commands::Predict {
                text, threshold, ..
            } => {
                assert_eq!(text.as_deref(), Some("Cardiac outcomes"));
                assert_eq!(threshold, Some(0.3));
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_parse_predict_title_abstract() {
        let cli = Cli::try_parse_from([
            "medlabel",
            "predict",
            "--title",
            "Heart study",
            "--abstract",
            "Ischemia in patients",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Predict { text: None, title: Some(_), abstract_text: Some(_), .. }
        ));
    }

    #[test]
    fn test_predict_requires_input() {
        assert!(Cli::try_parse_from(["medlabel", "predict"]).is_err());
        assert!(Cli::try_parse_from(["medlabel", "predict", "--title", "only title"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "medlabel",
            "classes",
            "--atomic",
            "--json",
            "--model-dir",
            "/models/scibert",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.model_dir, Some(PathBuf::from("/models/scibert")));
        assert!(matches!(cli.command, Commands::Classes { atomic: true }));
    }
}
