//! Error types for the heatmap crates.

use thiserror::Error;

/// Result type alias using HeatmapError.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Primary error type for heatmap operations.
#[derive(Debug, Error)]
pub enum HeatmapError {
    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid gradient: {0}")]
    InvalidGradient(String),

    // === Data Errors ===
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    // === Export Errors ===
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),

    // === Infrastructure Errors ===
    #[error("IO error: {0}")]
    IoError(String),
}

impl HeatmapError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an InvalidGradient error.
    pub fn invalid_gradient(msg: impl Into<String>) -> Self {
        Self::InvalidGradient(msg.into())
    }

    /// Create an EncodingFailed error.
    pub fn encoding_failed(msg: impl Into<String>) -> Self {
        Self::EncodingFailed(msg.into())
    }
}

// Conversion from common error types
impl From<std::io::Error> for HeatmapError {
    fn from(err: std::io::Error) -> Self {
        HeatmapError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for HeatmapError {
    fn from(err: serde_json::Error) -> Self {
        HeatmapError::ParseError(err.to_string())
    }
}
