//! Configuration for the renderer.

use crate::error::{RenderError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// How aggregation work is partitioned across workers.
    pub strategy: Strategy,

    /// Aggregation granularity: glyphs per chunk or pixels per tile.
    pub task_size: u64,

    /// Pixels per tile when applying item-wise transfers.
    pub transfer_task_size: u64,

    /// Worker threads (0 = one per core).
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::PixelParallel,
            task_size: 100_000,
            transfer_task_size: 10_000,
            threads: 0,
        }
    }
}

impl RenderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("AR_RENDER_STRATEGY") {
            config.strategy = Strategy::from_str(&val);
        }

        if let Ok(val) = std::env::var("AR_TASK_SIZE") {
            if let Ok(size) = val.parse() {
                config.task_size = size;
            }
        }

        if let Ok(val) = std::env::var("AR_TRANSFER_TASK_SIZE") {
            if let Ok(size) = val.parse() {
                config.transfer_task_size = size;
            }
        }

        if let Ok(val) = std::env::var("AR_THREADS") {
            if let Ok(threads) = val.parse() {
                config.threads = threads;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.task_size == 0 {
            return Err(RenderError::config("task_size must be > 0"));
        }

        if self.transfer_task_size == 0 {
            return Err(RenderError::config("transfer_task_size must be > 0"));
        }

        Ok(())
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

/// Work partitioning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// One tile covering the viewport, on the calling thread.
    #[serde(rename = "serial")]
    Serial,
    /// Split the glyphs; every worker builds a full grid and partials are rolled up.
    #[serde(rename = "glyph")]
    GlyphParallel,
    /// Split the viewport into disjoint tiles (recommended).
    #[serde(rename = "pixel")]
    PixelParallel,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::PixelParallel
    }
}

impl Strategy {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "serial" => Self::Serial,
            "glyph" | "glyph_parallel" => Self::GlyphParallel,
            "pixel" | "pixel_parallel" => Self::PixelParallel,
            _ => Self::PixelParallel,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::GlyphParallel => "glyph",
            Self::PixelParallel => "pixel",
        }
    }

    pub fn all() -> [Strategy; 3] {
        [Self::Serial, Self::GlyphParallel, Self::PixelParallel]
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy, Strategy::PixelParallel);
    }

    #[test]
    fn test_zero_task_size_rejected() {
        let config = RenderConfig {
            task_size: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::Config(_))));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(Strategy::from_str("SERIAL"), Strategy::Serial);
        assert_eq!(Strategy::from_str("glyph"), Strategy::GlyphParallel);
        assert_eq!(Strategy::from_str("unknown"), Strategy::PixelParallel);
        for s in Strategy::all() {
            assert_eq!(Strategy::from_str(s.as_str()), s);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&RenderConfig::default().with_strategy(Strategy::GlyphParallel))
            .unwrap();
        assert!(json.contains("\"glyph\""));
        let back: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.strategy, Strategy::GlyphParallel);
    }
}
