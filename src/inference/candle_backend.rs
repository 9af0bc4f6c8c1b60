//! Candle-based inference backend for the multilabel abstract classifier.
//!
//! Pure-Rust ML runtime using candle with Metal GPU acceleration on macOS.
//! Provides [`BertMultiLabelClassifier`], a BERT/SciBERT sequence
//! classification checkpoint with independent sigmoid outputs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{LayerNorm, Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::inference::ClassifierBackend;

/// File name of the persisted label vocabulary inside a model directory.
pub const LABELS_FILE: &str = "label_encoder.json";

/// Paths to the files that make up a trained classifier.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub weights_path: PathBuf,
    /// `label_encoder.json`, when shipped alongside the model.
    pub labels_path: Option<PathBuf>,
}

impl ModelFiles {
    /// Locate model files in a local directory (e.g. `./scibert_classifier`).
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let require = |name: &str| -> Result<PathBuf> {
            let path = dir.join(name);
            if path.is_file() {
                Ok(path)
            } else {
                anyhow::bail!("Model directory {} is missing {}", dir.display(), name)
            }
        };

        let labels_path = dir.join(LABELS_FILE);
        Ok(Self {
            config_path: require("config.json")?,
            tokenizer_path: require("tokenizer.json")?,
            weights_path: require("model.safetensors")?,
            labels_path: labels_path.is_file().then_some(labels_path),
        })
    }
}

/// Download model files from HuggingFace Hub.
///
/// Uses `hf_hub::api::sync::Api` which caches at `~/.cache/huggingface/hub/`.
/// Performs synchronous I/O; call it before entering request handling.
pub fn download_model(repo_id: &str) -> Result<ModelFiles> {
    let api = hf_hub::api::sync::Api::new().context("Failed to initialize HuggingFace Hub API")?;
    let repo = api.model(repo_id.to_string());

    let config_path = repo
        .get("config.json")
        .context("Failed to download config.json")?;
    let tokenizer_path = repo
        .get("tokenizer.json")
        .context("Failed to download tokenizer.json")?;
    let weights_path = repo
        .get("model.safetensors")
        .context("Failed to download model.safetensors")?;
    let labels_path = match repo.get(LABELS_FILE) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::debug!("{} not available in {}: {}", LABELS_FILE, repo_id, e);
            None
        }
    };

    Ok(ModelFiles {
        config_path,
        tokenizer_path,
        weights_path,
        labels_path,
    })
}

/// Select the best available compute device.
///
/// Tries Metal (macOS) or CUDA (Linux/Windows) if the corresponding feature
/// is enabled. Probes layer-norm support since BERT requires it, and
/// falls back to CPU if the GPU backend lacks the kernel.
pub fn select_device() -> Device {
    #[cfg(target_os = "macos")]
    {
        if let Ok(device) = Device::new_metal(0) {
            if probe_layer_norm(&device) {
                tracing::info!("Using Metal GPU for inference");
                return device;
            }
            tracing::warn!("Metal GPU available but layer-norm not supported, falling back to CPU");
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            if probe_layer_norm(&device) {
                tracing::info!("Using CUDA GPU for inference");
                return device;
            }
            tracing::warn!("CUDA GPU available but layer-norm not supported, falling back to CPU");
        }
    }
    tracing::info!("Using CPU for inference");
    Device::Cpu
}

/// Probe whether a device supports layer-norm (required by BERT).
fn probe_layer_norm(device: &Device) -> bool {
    (|| -> candle_core::Result<()> {
        let weight = Tensor::ones(4, DType::F32, device)?;
        let bias = Tensor::zeros(4, DType::F32, device)?;
        let ln = LayerNorm::new(weight, bias, 1e-5);
        let input = Tensor::randn(0f32, 1.0, (1, 4), device)?;
        let _ = ln.forward(&input)?;
        Ok(())
    })()
    .is_ok()
}

fn describe_device(device: &Device) -> String {
    if device.is_cuda() {
        "cuda".to_string()
    } else if device.is_metal() {
        "metal".to_string()
    } else {
        "cpu".to_string()
    }
}

/// Multi-label sequence classifier on a BERT encoder.
///
/// Runs the encoder, passes the `[CLS]` state through the pooler
/// (dense + tanh) and the classification head, then applies an independent
/// sigmoid per output unit. Compatible with HuggingFace
/// `BertForSequenceClassification` checkpoints such as fine-tuned SciBERT.
pub struct BertMultiLabelClassifier {
    model: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
    num_labels: usize,
}

impl BertMultiLabelClassifier {
    /// Load a classifier whose head emits `num_labels` units.
    ///
    /// `num_labels` must match the label vocabulary; a head of a different
    /// width fails to load.
    pub fn new(
        files: &ModelFiles,
        device: Device,
        num_labels: usize,
        max_sequence_length: usize,
    ) -> Result<Self> {
        if num_labels == 0 {
            anyhow::bail!("Classifier needs at least one output label");
        }

        let config_str = std::fs::read_to_string(&files.config_path)
            .context("Failed to read classifier config")?;
        let config: BertConfig =
            serde_json::from_str(&config_str).context("Failed to parse BERT config")?;

        // id2label is informational here; the vocabulary file is authoritative
        let config_json: serde_json::Value =
            serde_json::from_str(&config_str).context("Failed to parse config as JSON")?;
        if let Some(id2label) = config_json.get("id2label").and_then(|v| v.as_object()) {
            if id2label.len() != num_labels {
                tracing::warn!(
                    "config.json declares {} labels but the vocabulary has {}",
                    id2label.len(),
                    num_labels
                );
            }
        }

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load classifier tokenizer: {}", e))?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        // SAFETY: mmap'd safetensors file; safe as long as the file is not modified
        // while the model is in use.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, &device)
                .context("Failed to load classifier weights")?
        };

        let pooler = candle_nn::linear(
            config.hidden_size,
            config.hidden_size,
            vb.pp("bert").pp("pooler").pp("dense"),
        )
        .context("Failed to load bert.pooler.dense")?;
        let classifier = candle_nn::linear(config.hidden_size, num_labels, vb.pp("classifier"))
            .with_context(|| {
                format!("Failed to load classifier head with {} outputs", num_labels)
            })?;

        let model = BertModel::load(vb.pp("bert"), &config)
            .context("Failed to construct BERT model")?;

        Ok(Self {
            model,
            pooler,
            classifier,
            tokenizer,
            device,
            num_labels,
        })
    }

    /// Classify texts into independent per-label probabilities.
    ///
    /// Returns one `Vec<f32>` of length `num_labels` per input text.
    pub fn classify(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let str_refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let encodings = self
            .tokenizer
            .encode_batch(str_refs, true)
            .map_err(|e| anyhow::anyhow!("Classifier tokenization failed: {}", e))?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let input_ids: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_ids().to_vec())
            .collect();
        let attention_mask: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_attention_mask().to_vec())
            .collect();
        let token_type_ids: Vec<u32> = encodings
            .iter()
            .flat_map(|e| e.get_type_ids().to_vec())
            .collect();

        let input_ids = Tensor::from_vec(input_ids, (batch_size, max_len), &self.device)?;
        let attention_mask =
            Tensor::from_vec(attention_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(token_type_ids, (batch_size, max_len), &self.device)?;

        // Forward pass -> [batch, seq_len, hidden_size]
        let hidden_states = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Pool the [CLS] token -> [batch, hidden_size]
        let cls = hidden_states.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;

        // Classification head -> [batch, num_labels]
        let logits = self.classifier.forward(&pooled)?;

        // Sigmoid, not softmax: categories are not mutually exclusive
        let scores = candle_nn::ops::sigmoid(&logits)?;
        scores
            .to_vec2::<f32>()
            .context("Failed to convert classifier scores to Vec")
    }

    /// Get the number of classification labels.
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }
}

impl ClassifierBackend for BertMultiLabelClassifier {
    fn probabilities(&self, text: &str) -> Result<Vec<f32>> {
        self.classify(&[text.to_string()])?
            .into_iter()
            .next()
            .context("Empty classification result")
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn device_name(&self) -> String {
        describe_device(&self.device)
    }
}
