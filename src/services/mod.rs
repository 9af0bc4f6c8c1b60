pub mod api;
pub mod artifacts;
pub mod batch;
pub mod classifier;
pub mod metrics;
pub mod progress;

pub use api::MlService;
pub use artifacts::{ArtifactHandle, ArtifactStore};
pub use batch::{BatchEvaluation, BatchEvaluator};
pub use classifier::{InferenceEngine, TextLimits};
pub use metrics::{compute_metrics, compute_metrics_with_failures};
pub use progress::{noop_progress, NoopProgressReporter, ProgressReporter};
