//! Tests for the metric config store and the result store.

use chrono::{TimeZone, Utc};
use extract_common::{ExtractionResult, MetricId};
use storage::{MetricConfigStore, ResultStore};
use test_utils::fixtures::config::{disabled_metric_yaml, metric_yaml};

// ============================================================================
// MetricConfigStore tests
// ============================================================================

fn write_config(dir: &std::path::Path, filename: &str, content: &str) {
    std::fs::write(dir.join(filename), content).unwrap();
}

#[test]
fn test_load_configs_in_filename_order() {
    let tmp = tempfile::tempdir().unwrap();
    let metrics_dir = tmp.path().join("metrics");
    std::fs::create_dir_all(&metrics_dir).unwrap();

    // Filenames deliberately disagree with alphabetical metric ids so
    // the test proves filename order governs slot order.
    write_config(
        &metrics_dir,
        "10_temperature.yaml",
        &metric_yaml("temperature", "AIRS_Temp", 200.0, 340.0),
    );
    write_config(
        &metrics_dir,
        "20_evi.yaml",
        &metric_yaml("evi", "MODIS_EVI", -0.2, 1.0),
    );
    write_config(
        &metrics_dir,
        "30_humidity.yaml",
        &metric_yaml("humidity", "AIRS_RelHum", 0.0, 100.0),
    );

    let store = MetricConfigStore::load(tmp.path()).unwrap();
    let ids: Vec<String> = store
        .metric_ids()
        .iter()
        .map(|id| id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["temperature", "evi", "humidity"]);
}

#[test]
fn test_load_skips_disabled_and_broken_configs() {
    let tmp = tempfile::tempdir().unwrap();
    let metrics_dir = tmp.path().join("metrics");
    std::fs::create_dir_all(&metrics_dir).unwrap();

    write_config(
        &metrics_dir,
        "precipitation.yaml",
        &metric_yaml("precipitation", "IMERG_Rain", 0.0, 25.0),
    );
    write_config(&metrics_dir, "evi.yaml", &disabled_metric_yaml("evi"));
    write_config(&metrics_dir, "broken.yaml", "metric: [not, a, mapping");
    // Inverted calibration fails validation, so this one is skipped too.
    write_config(
        &metrics_dir,
        "inverted.yaml",
        &metric_yaml("inverted", "Layer", 50.0, 10.0),
    );
    // Non-YAML files are ignored entirely.
    write_config(&metrics_dir, "notes.txt", "not a config");

    let store = MetricConfigStore::load(tmp.path()).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.get("precipitation").is_some());
    assert!(store.get("evi").is_none());
}

#[test]
fn test_load_missing_directory_yields_empty_store() {
    let tmp = tempfile::tempdir().unwrap();
    let store = MetricConfigStore::load(tmp.path()).unwrap();
    assert!(store.is_empty());
}

// ============================================================================
// ResultStore tests
// ============================================================================

fn sample_result(metric: &str, average: Option<f64>) -> ExtractionResult {
    ExtractionResult {
        metric: MetricId::new(metric),
        average_value: average,
        nan_count: 3,
        total_pixels: 100,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 45).unwrap(),
    }
}

#[tokio::test]
async fn test_append_writes_record() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ResultStore::new(tmp.path().join("results"));

    let result = sample_result("temperature", Some(275.02));
    let path = store.append(&result).await.unwrap();

    let filename = path.file_name().unwrap().to_str().unwrap();
    assert!(filename.starts_with("temperature_20240115123045"));
    assert!(filename.ends_with(".json"));

    let body = std::fs::read_to_string(&path).unwrap();
    let back: ExtractionResult = serde_json::from_str(&body).unwrap();
    assert_eq!(back, result);
}

#[tokio::test]
async fn test_append_persists_null_average() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ResultStore::new(tmp.path().join("results"));

    let result = sample_result("evi", None);
    let path = store.append(&result).await.unwrap();

    let body = std::fs::read_to_string(&path).unwrap();
    assert!(body.contains("\"average_value\": null"));
}

#[tokio::test]
async fn test_append_never_overwrites() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ResultStore::new(tmp.path().join("results"));

    // Identical metric and timestamp produce the same filename; the
    // second write must fail rather than clobber the first record.
    let result = sample_result("humidity", Some(53.6));
    store.append(&result).await.unwrap();
    let err = store.append(&result).await.unwrap_err();
    assert!(err.to_string().contains("persist"));
}

#[tokio::test]
async fn test_append_creates_results_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let nested = tmp.path().join("deep").join("results");
    let store = ResultStore::new(&nested);

    store
        .append(&sample_result("precipitation", Some(1.25)))
        .await
        .unwrap();
    assert!(nested.is_dir());
}
