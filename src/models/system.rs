//! Health and status reports.

use serde::{Deserialize, Serialize};

/// Overall service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    /// Model, tokenizer or vocabulary not loaded.
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub model_loaded: bool,
    /// RFC 3339 timestamp of the check.
    pub timestamp: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub app_name: String,
    pub version: String,
    pub model_loaded: bool,
    pub total_classes: usize,
    pub total_categories: usize,
    pub max_sequence_length: usize,
    pub device: String,
    pub timestamp: String,
}
