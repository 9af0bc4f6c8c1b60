//! Progress reporting for batch evaluation.
//!
//! The CLI drives an `indicatif` bar through this trait; the service facade
//! and tests use [`NoopProgressReporter`].

use std::sync::Arc;

use async_trait::async_trait;

/// Receives per-row progress from a long-running batch.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// `done` rows of `total` have been classified. Must never fail the caller.
    async fn report(&self, done: usize, total: usize, message: Option<String>);

    /// The batch finished (successfully or not).
    async fn finish(&self, _message: &str) {}
}

pub struct NoopProgressReporter;

#[async_trait]
impl ProgressReporter for NoopProgressReporter {
    async fn report(&self, _done: usize, _total: usize, _message: Option<String>) {}
}

pub fn noop_progress() -> Arc<dyn ProgressReporter> {
    Arc::new(NoopProgressReporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        seen: Mutex<Vec<(usize, usize)>>,
        finished: Mutex<Option<String>>,
    }

    #[async_trait]
    impl ProgressReporter for RecordingReporter {
        async fn report(&self, done: usize, total: usize, _message: Option<String>) {
            self.seen.lock().unwrap().push((done, total));
        }

        async fn finish(&self, message: &str) {
            *self.finished.lock().unwrap() = Some(message.to_string());
        }
    }

    #[tokio::test]
    async fn test_noop_reporter_does_nothing() {
        let reporter = noop_progress();
        reporter.report(1, 2, Some("row 1".into())).await;
        reporter.finish("done").await;
    }

    #[tokio::test]
    async fn test_recording_reporter_sees_rows() {
        let reporter = RecordingReporter::default();
        reporter.report(1, 2, None).await;
        reporter.report(2, 2, None).await;
        reporter.finish("2 rows").await;
        assert_eq!(*reporter.seen.lock().unwrap(), vec![(1, 2), (2, 2)]);
        assert_eq!(reporter.finished.lock().unwrap().as_deref(), Some("2 rows"));
    }
}
