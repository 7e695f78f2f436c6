//! Error types for aggregation and transfer.

use glyphset::GlyphsetError;
use thiserror::Error;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Glyphset error: {0}")]
    Glyphset(#[from] GlyphsetError),

    #[error("View transform is not invertible")]
    NonInvertibleTransform,

    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Failed to build worker pool: {0}")]
    PoolBuild(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RenderError {
    pub fn transfer(msg: impl Into<String>) -> Self {
        Self::Transfer(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
