//! Extraction result records and per-job outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metric::MetricId;

/// Spatial-average record produced by one extraction job.
///
/// `average_value` is `None` when every pixel in the cropped region was
/// no-data; the record is still persisted so a fully-dark frame leaves
/// an auditable trace rather than vanishing silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub metric: MetricId,
    pub average_value: Option<f64>,
    pub nan_count: usize,
    pub total_pixels: usize,
    pub timestamp: DateTime<Utc>,
}

impl ExtractionResult {
    /// Fraction of the region that carried data, in [0, 1].
    ///
    /// Counts arriving from deserialized records are not trusted to be
    /// consistent, so an oversized `nan_count` clamps to zero coverage.
    pub fn coverage(&self) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        self.total_pixels.saturating_sub(self.nan_count) as f64 / self.total_pixels as f64
    }
}

/// Terminal state of one metric's extraction job.
///
/// A failed job never disturbs its siblings; the orchestrator records
/// the failure in the job's slot and the remaining jobs run to
/// completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Success { result: ExtractionResult },
    Failure { metric: MetricId, reason: String },
}

impl JobOutcome {
    pub fn metric_id(&self) -> &MetricId {
        match self {
            JobOutcome::Success { result } => &result.metric,
            JobOutcome::Failure { metric, .. } => metric,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }
}
