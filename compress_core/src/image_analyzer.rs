//! Image Analysis Surface
//!
//! Entry points the boundary layer calls before (or instead of)
//! compressing: full content analysis with a recommendation string, format
//! support listing, and cheap input validation.

use crate::compression_types::{DecodedImage, OutputFormat};
use crate::errors::Result;
use crate::image_metrics::{compute_metrics, ImageMetricsResult};
use crate::strategy::{select_strategy, CompressionStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

const LARGE_FILE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub file_size: u64,
    pub has_alpha: bool,
    pub metrics: ImageMetricsResult,
    pub strategy: CompressionStrategy,
    pub recommended_quality: u8,
    pub recommended_format: OutputFormat,
    pub recommendation: String,
}

/// Analyze raw image bytes: decode, measure, select a strategy, and build
/// the advisory text.
pub fn analyze(bytes: &[u8]) -> Result<ImageAnalysis> {
    let decoded = DecodedImage::from_bytes(bytes)?;
    let metrics = compute_metrics(&decoded.image, bytes);
    let strategy = select_strategy(&metrics);
    let file_size = bytes.len() as u64;

    debug!(
        width = decoded.width(),
        height = decoded.height(),
        format = decoded.format_name(),
        strategy = strategy.as_str(),
        "Image analyzed"
    );

    Ok(ImageAnalysis {
        width: decoded.width(),
        height: decoded.height(),
        format: decoded.format_name().to_string(),
        file_size,
        has_alpha: decoded.has_alpha(),
        recommendation: build_recommendation(file_size, &metrics, decoded.has_alpha()),
        recommended_quality: strategy.recommended_quality(),
        recommended_format: strategy.recommended_format(),
        metrics,
        strategy,
    })
}

fn build_recommendation(file_size: u64, metrics: &ImageMetricsResult, has_alpha: bool) -> String {
    let mut phrases: Vec<&str> = Vec::new();

    if file_size > LARGE_FILE_BYTES {
        phrases.push("Large file; compression is strongly recommended.");
    }

    if metrics.complexity > 0.7 {
        phrases.push("High detail content; keep quality high to avoid visible artifacts.");
    } else if metrics.complexity < 0.3 {
        phrases.push("Simple content; aggressive compression will stay clean.");
    } else {
        phrases.push("Moderate detail; balanced compression works well.");
    }

    if has_alpha {
        phrases.push("Transparency detected; prefer png or webp output.");
    } else {
        phrases.push("No transparency; jpeg output gives the smallest files.");
    }

    phrases.join(" ")
}

/// Format tags accepted by the engine's output side.
pub fn supported_formats() -> &'static [&'static str] {
    &["jpeg", "jpg", "png", "webp"]
}

/// Quick acceptance check: non-empty, within the size cap, and decodable.
/// The filename serves as a format hint when content sniffing fails.
pub fn validate(bytes: &[u8], filename: &str) -> bool {
    if bytes.is_empty() {
        debug!(filename, "Rejected empty input");
        return false;
    }
    if bytes.len() as u64 > MAX_INPUT_BYTES {
        debug!(filename, size = bytes.len(), "Rejected oversized input");
        return false;
    }
    DecodedImage::from_bytes_with_hint(bytes, Some(filename)).is_ok()
}
