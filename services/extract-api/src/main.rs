//! Map extraction API service.
//!
//! Captures a remote interactive map per configured metric, decodes the
//! color-encoded pixels into physical values, and serves the spatial
//! averages over HTTP.

mod server;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use capture::{WebDriverCapture, WebDriverConfig};
use extract_common::PixelRect;
use extraction::{JobRunner, Orchestrator};
use storage::{MetricConfigStore, ResultStore};

use server::{start_server, ExtractionTracker, ServerState};

#[derive(Parser, Debug)]
#[command(name = "extract-api")]
#[command(about = "Map capture and color-decode extraction API")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    listen: String,

    /// Configuration directory (metric templates live in metrics/)
    #[arg(short, long, default_value = "config")]
    config_dir: String,

    /// Directory for extraction result records
    #[arg(long, default_value = "data/results")]
    results_dir: String,

    /// Directory for capture/crop snapshot PNGs (diagnostics, off by default)
    #[arg(long)]
    snapshot_dir: Option<String>,

    /// WebDriver endpoint for headless captures
    #[arg(long, default_value = "http://localhost:9515", env = "WEBDRIVER_URL")]
    webdriver_url: String,

    /// Seconds to wait for the map element to become visible
    #[arg(long, default_value_t = 10)]
    visibility_timeout_secs: u64,

    /// Seconds to let tiles settle after the element is visible
    #[arg(long, default_value_t = 5)]
    settle_delay_secs: u64,

    /// Crop region within the captured raster, as left,top,right,bottom
    #[arg(long, default_value = "449,94,1713,722")]
    crop_region: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    info!("Starting map extraction API");

    let region = parse_crop_region(&args.crop_region)?;
    info!(
        region = %region,
        width = region.width(),
        height = region.height(),
        "Using crop region"
    );

    let configs = MetricConfigStore::load(Path::new(&args.config_dir))
        .context("Failed to load metric configurations")?;
    if configs.is_empty() {
        info!("No metrics configured; /extract will return empty outcomes");
    }

    let webdriver_config = WebDriverConfig {
        endpoint: args.webdriver_url.clone(),
        visibility_timeout: std::time::Duration::from_secs(args.visibility_timeout_secs),
        settle_delay: std::time::Duration::from_secs(args.settle_delay_secs),
        ..WebDriverConfig::default()
    };
    let capture = WebDriverCapture::new(webdriver_config)
        .context("Failed to create WebDriver capture client")?;
    info!(endpoint = %args.webdriver_url, "WebDriver capture configured");

    let results = ResultStore::new(&args.results_dir);
    let mut runner = JobRunner::new(Arc::new(capture), results);
    if let Some(dir) = &args.snapshot_dir {
        info!(dir = %dir, "Snapshot diagnostics enabled");
        runner = runner.with_snapshot_dir(dir);
    }

    let orchestrator = Orchestrator::new(Arc::new(configs), Arc::new(runner), region);

    let state = Arc::new(ServerState {
        orchestrator,
        tracker: ExtractionTracker::new(),
    });

    start_server(state, prometheus_handle, &args.listen).await
}

/// Parse "left,top,right,bottom" into a crop rectangle.
fn parse_crop_region(spec: &str) -> Result<PixelRect> {
    let parts: Vec<u32> = spec
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid crop region '{}'", spec))?;

    if parts.len() != 4 {
        return Err(anyhow!(
            "Crop region must have four components, got {} in '{}'",
            parts.len(),
            spec
        ));
    }

    let rect = PixelRect::new(parts[0], parts[1], parts[2], parts[3]);
    if !rect.is_valid() {
        return Err(anyhow!("Crop region '{}' has no area", spec));
    }
    Ok(rect)
}
