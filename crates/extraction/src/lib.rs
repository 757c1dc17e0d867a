//! Extraction jobs and their orchestration.
//!
//! One job takes a single metric from assembled URL to persisted
//! spatial average: capture, crop, decode, aggregate, append. The
//! orchestrator fans a request out into one job per configured metric
//! and collects outcomes in a fixed order, isolating failures to the
//! slot they occurred in.

pub mod job;
pub mod orchestrator;

pub use job::{JobRunner, JobSpec};
pub use orchestrator::Orchestrator;
