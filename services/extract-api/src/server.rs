//! HTTP server for the extraction service.
//!
//! Provides endpoints for:
//! - `POST /extract` - Run all configured metric extractions for a view
//! - `GET /status` - Configured metrics plus active/recent requests
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use extract_common::{JobOutcome, ViewState};
use extraction::Orchestrator;

/// Shared state for the HTTP server.
pub struct ServerState {
    /// Fans requests out into per-metric jobs
    pub orchestrator: Orchestrator,
    /// Tracking for active/completed extraction requests
    pub tracker: ExtractionTracker,
}

/// Request body for /extract endpoint.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Opaque view parameters (pan/zoom/time state) appended to every
    /// metric's page URL; may be empty to use each template as-is
    #[serde(default)]
    pub view_state: String,
}

/// Response body for /extract endpoint.
///
/// `outcomes[i]` always belongs to the i-th configured metric.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub request_id: String,
    pub view_state: String,
    pub outcomes: Vec<JobOutcome>,
}

/// Tracking for extraction requests.
pub struct ExtractionTracker {
    active: Mutex<std::collections::HashMap<String, ActiveExtraction>>,
    completed: Mutex<VecDeque<CompletedExtraction>>,
    max_completed: usize,
}

/// An in-flight extraction request.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveExtraction {
    pub id: String,
    pub view_state: String,
    pub metrics: usize,
    pub started_at: DateTime<Utc>,
    pub status: String,
}

/// A finished extraction request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedExtraction {
    pub id: String,
    pub view_state: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub succeeded: usize,
    pub failed: usize,
}

impl ExtractionTracker {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(std::collections::HashMap::new()),
            completed: Mutex::new(VecDeque::new()),
            max_completed: 100,
        }
    }

    pub async fn start(&self, id: &str, view_state: &str, metrics: usize) {
        let extraction = ActiveExtraction {
            id: id.to_string(),
            view_state: view_state.to_string(),
            metrics,
            started_at: Utc::now(),
            status: "processing".to_string(),
        };
        self.active.lock().await.insert(id.to_string(), extraction);
    }

    pub async fn complete(&self, id: &str, succeeded: usize, failed: usize) {
        let mut active = self.active.lock().await;
        if let Some(extraction) = active.remove(id) {
            let completed_at = Utc::now();
            let duration_ms = (completed_at - extraction.started_at).num_milliseconds() as u64;

            let completed = CompletedExtraction {
                id: extraction.id,
                view_state: extraction.view_state,
                started_at: extraction.started_at,
                completed_at,
                duration_ms,
                succeeded,
                failed,
            };

            let mut completed_list = self.completed.lock().await;
            completed_list.push_front(completed);

            // Keep only recent entries
            while completed_list.len() > self.max_completed {
                completed_list.pop_back();
            }
        }
    }

    pub async fn get_status(&self, metrics: Vec<String>) -> StatusResponse {
        let active = self.active.lock().await;
        let completed = self.completed.lock().await;

        StatusResponse {
            metrics,
            active: active.values().cloned().collect(),
            recent: completed.iter().take(20).cloned().collect(),
            total_completed: completed.len(),
        }
    }
}

/// Response for /status endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub metrics: Vec<String>,
    pub active: Vec<ActiveExtraction>,
    pub recent: Vec<CompletedExtraction>,
    pub total_completed: usize,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// POST /extract - Run all configured extractions for one view state
async fn extract_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Json(request): Json<ExtractRequest>,
) -> impl IntoResponse {
    let id = Uuid::new_v4().to_string();
    let view_state = ViewState::new(request.view_state);

    info!(
        id = %id,
        view_state = %view_state,
        metrics = state.orchestrator.metric_count(),
        "Received extract request"
    );

    state
        .tracker
        .start(&id, view_state.as_str(), state.orchestrator.metric_count())
        .await;

    // The fan-out and its tracker bookkeeping run as their own task: a
    // client disconnect drops this handler future mid-await while the
    // per-metric jobs keep running detached, so completion accounting
    // cannot live on the handler's own path.
    let worker_state = Arc::clone(&state);
    let worker_id = id.clone();
    let worker_view = view_state.clone();
    let worker = tokio::spawn(async move {
        let outcomes = worker_state.orchestrator.extract_all(&worker_view).await;
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - succeeded;
        worker_state
            .tracker
            .complete(&worker_id, succeeded, failed)
            .await;
        info!(id = %worker_id, succeeded, failed, "Extract request complete");
        outcomes
    });

    match worker.await {
        // Per-metric failures ride inside outcomes; the request itself
        // succeeded as long as the fan-out ran.
        Ok(outcomes) => (
            StatusCode::OK,
            Json(ExtractResponse {
                request_id: id,
                view_state: view_state.to_string(),
                outcomes,
            }),
        ),
        Err(e) => {
            error!(id = %id, error = %e, "Extraction worker task aborted");
            state
                .tracker
                .complete(&id, 0, state.orchestrator.metric_count())
                .await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ExtractResponse {
                    request_id: id,
                    view_state: view_state.to_string(),
                    outcomes: Vec::new(),
                }),
            )
        }
    }
}

/// GET /status - Configured metrics and request tracking
async fn status_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    let metrics = state
        .orchestrator
        .metric_ids()
        .iter()
        .map(|id| id.to_string())
        .collect();
    Json(state.tracker.get_status(metrics).await)
}

/// GET /health - Health check
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "extract-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /metrics - Prometheus metrics
async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

/// Build the HTTP router.
pub fn build_router(state: Arc<ServerState>, prometheus_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/extract", post(extract_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(Extension(state))
        .layer(Extension(prometheus_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the HTTP server.
pub async fn start_server(
    state: Arc<ServerState>,
    prometheus_handle: PrometheusHandle,
    listen: &str,
) -> anyhow::Result<()> {
    let app = build_router(state, prometheus_handle);

    let addr: SocketAddr = listen.parse()?;
    info!(address = %addr, "Starting extraction HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
