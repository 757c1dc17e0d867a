//! Error types for map-extract services.

use thiserror::Error;

/// Result type alias using ExtractError.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Primary error type for extraction operations.
#[derive(Debug, Error)]
pub enum ExtractError {
    // === Capture Errors ===
    #[error("capture failed: {0}")]
    Capture(String),

    // === Raster Errors ===
    #[error("invalid crop region: {0}")]
    InvalidRegion(String),

    // === Storage Errors ===
    #[error("failed to persist result: {0}")]
    Persistence(String),

    // === Configuration Errors ===
    #[error("configuration error: {0}")]
    Config(String),
}

impl ExtractError {
    /// Create a Capture error.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Create an InvalidRegion error.
    pub fn invalid_region(msg: impl Into<String>) -> Self {
        Self::InvalidRegion(msg.into())
    }

    /// Create a Persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

// Conversion from common error types
impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::Persistence(format!("JSON error: {}", err))
    }
}
