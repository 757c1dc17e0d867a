//! Persistence for map-extract: metric config templates and extraction
//! result records.
//!
//! Config templates are loaded once at startup and never written back;
//! per-request state lives in request-scoped values, not on disk. The
//! result store is append-only.

pub mod config;
pub mod results;

pub use config::{CalibrationConfig, MetricConfig, MetricConfigStore, MetricInfo, SourceConfig};
pub use results::ResultStore;
