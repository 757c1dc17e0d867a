//! Common types and utilities shared across all map-extract crates.

pub mod error;
pub mod metric;
pub mod region;
pub mod result;

pub use error::{ExtractError, ExtractResult};
pub use metric::{CalibrationRange, MetricId, ViewState};
pub use region::PixelRect;
pub use result::{ExtractionResult, JobOutcome};
