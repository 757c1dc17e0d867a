//! Single-metric extraction job.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use image::RgbImage;
use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use capture::MapCapture;
use decoder::{crop_region, mean_rgb, summarize, ScalarField};
use extract_common::{
    CalibrationRange, ExtractResult, ExtractionResult, JobOutcome, MetricId, PixelRect, ViewState,
};
use storage::{MetricConfig, ResultStore};

/// Everything one job needs, resolved up front.
///
/// A spec is built per request from the read-only metric template plus
/// the caller's view state and never mutated afterwards; concurrent
/// jobs share nothing writable.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub metric: MetricId,
    /// Fully assembled page URL, view state included
    pub url: String,
    pub element_id: String,
    pub region: PixelRect,
    pub calibration: CalibrationRange,
}

impl JobSpec {
    /// Merge a metric template with one request's view state.
    pub fn from_config(config: &MetricConfig, view_state: &ViewState, region: PixelRect) -> Self {
        Self {
            metric: config.metric_id(),
            url: config.view_url(view_state),
            element_id: config.source.element_id.clone(),
            region,
            calibration: config.calibration_range(),
        }
    }
}

/// Runs extraction jobs: capture, crop, decode, aggregate, persist.
pub struct JobRunner {
    capture: Arc<dyn MapCapture>,
    results: ResultStore,
    snapshot_dir: Option<PathBuf>,
}

impl JobRunner {
    pub fn new(capture: Arc<dyn MapCapture>, results: ResultStore) -> Self {
        Self {
            capture,
            results,
            snapshot_dir: None,
        }
    }

    /// Also save the captured and cropped rasters as PNGs for visual
    /// debugging of misaligned crops or half-drawn pages.
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    /// Run one job to a terminal outcome.
    ///
    /// Every failure mode, capture, crop, persistence, lands in a
    /// `Failure` outcome carrying the metric and a reason; errors never
    /// propagate past this point.
    pub async fn run(&self, spec: &JobSpec) -> JobOutcome {
        let metric_label = spec.metric.to_string();
        counter!("extractions_started_total", "metric" => metric_label.clone()).increment(1);

        match self.execute(spec).await {
            Ok(result) => {
                counter!("extractions_total", "metric" => metric_label, "status" => "success")
                    .increment(1);
                JobOutcome::Success { result }
            }
            Err(e) => {
                warn!(metric = %spec.metric, error = %e, "Extraction job failed");
                counter!("extractions_total", "metric" => metric_label, "status" => "failure")
                    .increment(1);
                JobOutcome::Failure {
                    metric: spec.metric.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn execute(&self, spec: &JobSpec) -> ExtractResult<ExtractionResult> {
        let metric_label = spec.metric.to_string();

        let capture_started = Instant::now();
        let screenshot = self.capture.capture(&spec.url, &spec.element_id).await?;
        histogram!("capture_duration_ms", "metric" => metric_label.clone())
            .record(capture_started.elapsed().as_secs_f64() * 1000.0);

        let cropped = crop_region(&screenshot, &spec.region)?;
        self.save_snapshots(&spec.metric, &screenshot, &cropped);

        let decode_started = Instant::now();
        let field = ScalarField::decode(&cropped, &spec.calibration);
        let summary = summarize(&field);
        histogram!("decode_duration_ms", "metric" => metric_label)
            .record(decode_started.elapsed().as_secs_f64() * 1000.0);

        let (mean_r, mean_g, mean_b) = mean_rgb(&cropped);
        debug!(
            metric = %spec.metric,
            mean_r = format!("{:.1}", mean_r),
            mean_g = format!("{:.1}", mean_g),
            mean_b = format!("{:.1}", mean_b),
            nan_count = summary.nan_count,
            total_pixels = summary.total,
            "Decoded capture"
        );

        if summary.mean.is_none() {
            warn!(metric = %spec.metric, "Every pixel was no-data; recording null average");
        }

        let result = ExtractionResult {
            metric: spec.metric.clone(),
            average_value: summary.mean,
            nan_count: summary.nan_count,
            total_pixels: summary.total,
            timestamp: Utc::now(),
        };

        // The value is computed by now, but an unrecorded result is a
        // failed job: callers rely on the store as the system of record.
        let path = self.results.append(&result).await?;

        info!(
            metric = %spec.metric,
            average = ?result.average_value,
            nan_count = result.nan_count,
            coverage = format!("{:.3}", result.coverage()),
            path = %path.display(),
            "Extraction complete"
        );
        Ok(result)
    }

    /// Best-effort snapshot writes; diagnostics never fail the job.
    fn save_snapshots(&self, metric: &MetricId, screenshot: &RgbImage, cropped: &RgbImage) {
        let Some(dir) = &self.snapshot_dir else {
            return;
        };
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "Failed to create snapshot directory");
            return;
        }

        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
        let shots = [
            (dir.join(format!("map_screenshot_{}_{}.png", metric, stamp)), screenshot),
            (dir.join(format!("cropped_map_{}_{}.png", metric, stamp)), cropped),
        ];
        for (path, image) in shots {
            if let Err(e) = image.save(&path) {
                warn!(path = %path.display(), error = %e, "Failed to save snapshot");
            }
        }
    }
}

/// Per-request job specs in config order.
pub fn specs_for_request(
    configs: &[MetricConfig],
    view_state: &ViewState,
    region: PixelRect,
) -> Vec<JobSpec> {
    configs
        .iter()
        .map(|config| JobSpec::from_config(config, view_state, region))
        .collect()
}
