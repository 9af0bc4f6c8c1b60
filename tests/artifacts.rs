//! Result artifact retrieval and expiry.

mod common;

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use common::{FixedBackend, TableBuilder, TestHarness};
use medlabel::ClassifierError;

fn harness() -> TestHarness {
    TestHarness::new(
        Arc::new(FixedBackend::new(vec![0.9, 0.2])),
        &[Some("cardiovascular"), Some("oncological")],
    )
}

async fn run_batch(harness: &TestHarness) -> String {
    let table = TableBuilder::new()
        .row(&["Heart", "Ischemia", "cardiovascular"])
        .build();
    harness
        .service()
        .evaluate_batch(&table, None)
        .await
        .unwrap()
        .download_locator
}

#[tokio::test]
async fn test_artifact_written_under_data_path() {
    let harness = harness();
    let locator = run_batch(&harness).await;

    let path = harness.service().fetch_artifact(&locator).unwrap();
    assert!(path.starts_with(harness.temp_dir.path().join("temp")));

    let name = locator.trim_start_matches("download/");
    assert_eq!(harness.service().fetch_artifact(name).unwrap(), path);
}

#[tokio::test]
async fn test_artifact_expires_after_ttl() {
    let harness = harness();
    let locator = run_batch(&harness).await;
    let name = locator.trim_start_matches("download/");
    let store = harness.service().artifacts();

    let path = store.open_at(name, SystemTime::now()).unwrap();
    assert!(path.exists());

    let later = SystemTime::now() + Duration::from_secs(3601);
    let err = store.open_at(name, later).unwrap_err();
    assert!(matches!(err, ClassifierError::NotFound { .. }));
    assert!(!path.exists());

    // Stays gone on the next request
    assert!(matches!(
        harness.service().fetch_artifact(name),
        Err(ClassifierError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_artifact_within_ttl_survives() {
    let harness = harness();
    let locator = run_batch(&harness).await;
    let name = locator.trim_start_matches("download/");

    let almost = SystemTime::now() + Duration::from_secs(3500);
    assert!(harness.service().artifacts().open_at(name, almost).is_ok());
}

#[tokio::test]
async fn test_consecutive_batches_get_distinct_names() {
    let harness = harness();
    let first = run_batch(&harness).await;
    let second = run_batch(&harness).await;
    assert_ne!(first, second);
}

#[test]
fn test_fetch_rejects_unsafe_names() {
    let harness = harness();
    for name in ["../classifier.toml", "download/../x.csv", "report.txt", "dir/file.csv"] {
        let err = harness.service().fetch_artifact(name).unwrap_err();
        assert!(
            matches!(err, ClassifierError::Validation(_)),
            "{} should be rejected",
            name
        );
    }
}

#[test]
fn test_fetch_unknown_artifact() {
    let harness = harness();
    let err = harness
        .service()
        .fetch_artifact("batch_predictions_20200101_000000_000000.csv")
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Not found: artifact 'batch_predictions_20200101_000000_000000.csv'");
}

#[test]
fn test_fetch_works_without_model() {
    let harness = TestHarness::unavailable();
    let err = harness
        .service()
        .fetch_artifact("batch_predictions_missing.csv")
        .unwrap_err();
    assert!(matches!(err, ClassifierError::NotFound { .. }));
}
