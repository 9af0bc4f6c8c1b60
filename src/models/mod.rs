//! Typed data exchanged between the classifier services and their callers.

pub mod batch;
pub mod metrics;
pub mod prediction;
pub mod system;

pub use batch::{AnnotatedRow, BatchResponse, BatchRow, BatchTable};
pub use metrics::{BatchMetrics, CategoryMetrics, ConfusionCounts};
pub use prediction::{
    compose_text, PredictionRequest, PredictionResponse, PredictionResult, UNKNOWN_CATEGORY,
};
pub use system::{HealthReport, HealthStatus, ServiceInfo};
