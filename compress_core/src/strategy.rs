//! Compression Strategy Selection
//!
//! Maps content metrics to one of four named strategies. The table is
//! evaluated top to bottom with strict comparisons; the first match wins.

use crate::compression_types::OutputFormat;
use crate::image_metrics::ImageMetricsResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStrategy {
    /// Busy or edge-heavy content, keep quality high
    HighQuality,
    /// Noisy content, compress hard
    Aggressive,
    /// Simple content, favor small output
    Efficient,
    /// Everything else
    Balanced,
}

impl CompressionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionStrategy::HighQuality => "high_quality",
            CompressionStrategy::Aggressive => "aggressive",
            CompressionStrategy::Efficient => "efficient",
            CompressionStrategy::Balanced => "balanced",
        }
    }

    pub fn recommended_quality(&self) -> u8 {
        match self {
            CompressionStrategy::HighQuality => 90,
            CompressionStrategy::Balanced => 80,
            CompressionStrategy::Efficient => 70,
            CompressionStrategy::Aggressive => 55,
        }
    }

    pub fn recommended_format(&self) -> OutputFormat {
        match self {
            CompressionStrategy::Efficient => OutputFormat::Webp,
            _ => OutputFormat::Jpeg,
        }
    }
}

/// Pick a strategy for the measured content. Pure; equal inputs always give
/// equal outputs.
pub fn select_strategy(metrics: &ImageMetricsResult) -> CompressionStrategy {
    if metrics.complexity > 0.7 || metrics.edge_density > 0.6 {
        CompressionStrategy::HighQuality
    } else if metrics.noise_level > 0.5 {
        CompressionStrategy::Aggressive
    } else if metrics.complexity < 0.3 && metrics.edge_density < 0.3 {
        CompressionStrategy::Efficient
    } else {
        CompressionStrategy::Balanced
    }
}
