//! Fans one request out into concurrent per-metric jobs.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info};

use extract_common::{JobOutcome, MetricId, PixelRect, ViewState};
use storage::MetricConfigStore;

use crate::job::{specs_for_request, JobRunner};

/// Runs every configured metric's job for a request and collects the
/// outcomes.
///
/// Outcome slots are positional: index `i` always belongs to the `i`-th
/// configured metric, regardless of which job finished first or whether
/// it failed. Jobs are spawned as independent tasks so one panicking or
/// slow job never takes its siblings with it.
pub struct Orchestrator {
    configs: Arc<MetricConfigStore>,
    runner: Arc<JobRunner>,
    region: PixelRect,
}

impl Orchestrator {
    pub fn new(configs: Arc<MetricConfigStore>, runner: Arc<JobRunner>, region: PixelRect) -> Self {
        Self {
            configs,
            runner,
            region,
        }
    }

    pub fn metric_ids(&self) -> Vec<MetricId> {
        self.configs.metric_ids()
    }

    pub fn metric_count(&self) -> usize {
        self.configs.len()
    }

    pub fn region(&self) -> PixelRect {
        self.region
    }

    /// Extract all configured metrics for one view state.
    ///
    /// Always returns exactly one outcome per configured metric, in
    /// config order. With no metrics configured the result is empty.
    pub async fn extract_all(&self, view_state: &ViewState) -> Vec<JobOutcome> {
        let specs = specs_for_request(self.configs.configs(), view_state, self.region);
        info!(
            metrics = specs.len(),
            view_state = %view_state,
            "Starting extraction fan-out"
        );

        let metrics: Vec<MetricId> = specs.iter().map(|s| s.metric.clone()).collect();
        let handles: Vec<_> = specs
            .into_iter()
            .map(|spec| {
                let runner = Arc::clone(&self.runner);
                tokio::spawn(async move { runner.run(&spec).await })
            })
            .collect();

        // join_all preserves spawn order, which is config order.
        let joined = join_all(handles).await;

        metrics
            .into_iter()
            .zip(joined)
            .map(|(metric, joined)| match joined {
                Ok(outcome) => outcome,
                // A panic inside one job surfaces here as a JoinError;
                // it fills that job's slot instead of unwinding further.
                Err(e) => {
                    error!(metric = %metric, error = %e, "Extraction task aborted");
                    JobOutcome::Failure {
                        metric,
                        reason: format!("job task failed: {}", e),
                    }
                }
            })
            .collect()
    }
}
