//! Classifier configuration.
//!
//! Loaded from `{data_path}/classifier.toml`, the `MEDLABEL_CONFIG` env var
//! (JSON), or defaults, in that order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ClassifierError;

pub const CONFIG_FILE: &str = "classifier.toml";
pub const CONFIG_ENV: &str = "MEDLABEL_CONFIG";

/// Where the trained model comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ModelSource {
    /// A local directory with `config.json`, `tokenizer.json`,
    /// `model.safetensors` and usually `label_encoder.json`.
    Local {
        #[serde(default = "default_model_dir")]
        dir: PathBuf,
    },
    /// A HuggingFace Hub repository.
    Hub { repo: String },
}

impl Default for ModelSource {
    fn default() -> Self {
        Self::Local {
            dir: default_model_dir(),
        }
    }
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("scibert_classifier")
}

/// Runtime configuration for the classifier service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub model: ModelSource,
    /// Overrides the `label_encoder.json` shipped with the model.
    pub labels_path: Option<PathBuf>,
    /// Tokenizer truncation length, in tokens.
    pub max_sequence_length: usize,
    /// Single-prediction input bounds, in characters.
    pub min_text_chars: usize,
    pub max_text_chars: usize,
    pub default_threshold: f32,
    /// Defaults to `{data_path}/temp`.
    pub artifact_dir: Option<PathBuf>,
    pub artifact_ttl_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: ModelSource::default(),
            labels_path: None,
            max_sequence_length: 512,
            min_text_chars: 10,
            max_text_chars: 5000,
            default_threshold: 0.5,
            artifact_dir: None,
            artifact_ttl_secs: 3600,
        }
    }
}

impl ClassifierConfig {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.min_text_chars > self.max_text_chars {
            return Err(ClassifierError::Validation(format!(
                "min_text_chars ({}) exceeds max_text_chars ({})",
                self.min_text_chars, self.max_text_chars
            )));
        }
        if self.max_sequence_length == 0 {
            return Err(ClassifierError::Validation(
                "max_sequence_length must be greater than 0".to_string(),
            ));
        }
        validate_threshold(self.default_threshold)
    }

    /// Artifact directory, resolved against the data path.
    pub fn artifact_dir(&self, data_path: &Path) -> PathBuf {
        self.artifact_dir
            .clone()
            .unwrap_or_else(|| data_path.join("temp"))
    }
}

/// Thresholds must lie in `[0, 1]`.
pub fn validate_threshold(threshold: f32) -> Result<(), ClassifierError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ClassifierError::Validation(format!(
            "threshold must be between 0.0 and 1.0, got {}",
            threshold
        )))
    }
}

/// Load classifier config with priority:
/// 1. `{data_path}/classifier.toml` file
/// 2. `MEDLABEL_CONFIG` env var (JSON)
/// 3. Defaults
pub fn load_config(data_path: &Path) -> ClassifierConfig {
    let config_path = data_path.join(CONFIG_FILE);
    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<ClassifierConfig>(&contents) {
                Ok(config) => {
                    info!("Loaded classifier config from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse {}: {}. Using default.",
                        config_path.display(),
                        e
                    );
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read {}: {}. Using default.",
                    config_path.display(),
                    e
                );
            }
        }
    }

    if let Ok(json) = std::env::var(CONFIG_ENV) {
        match serde_json::from_str::<ClassifierConfig>(&json) {
            Ok(config) => {
                info!("Loaded classifier config from {} env", CONFIG_ENV);
                return config;
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}. Using default.", CONFIG_ENV, e);
            }
        }
    }

    ClassifierConfig::default()
}
