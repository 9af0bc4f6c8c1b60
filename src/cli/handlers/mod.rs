//! CLI command handlers.

pub mod batch;
pub mod predict;
pub mod system;
