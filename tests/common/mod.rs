pub mod backends;
pub mod builders;
pub mod harness;

// Re-export commonly used test utilities
pub use backends::{CountingBackend, FailingBackend, FixedBackend, KeywordBackend};
pub use builders::TableBuilder;
pub use harness::TestHarness;
