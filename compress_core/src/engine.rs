//! Compression Engine
//!
//! Orchestrates decode, optional downscale, and re-encode across the three
//! execution paths. Remote failures in the hybrid path are recovered by
//! local encoding; only decode and encode failures surface to the caller.

use crate::compression_types::{
    CompressionMethod, CompressionOptions, CompressionResult, DecodedImage, OutputFormat,
};
use crate::errors::{CompressError, Result};
use crate::quality_analyzer;
use crate::quality_predictor;
use crate::remote_compressor::RemoteCompressor;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

static NEXT_RESULT_ID: AtomicU64 = AtomicU64::new(1);

fn next_result_id() -> String {
    format!("cmp-{}", NEXT_RESULT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Size reduction in percent, rounded to two decimals.
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let ratio = (1.0 - compressed_size as f64 / original_size as f64) * 100.0;
    (ratio * 100.0).round() / 100.0
}

pub struct CompressionEngine {
    remote: Option<Box<dyn RemoteCompressor>>,
}

impl Default for CompressionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionEngine {
    pub fn new() -> Self {
        Self { remote: None }
    }

    pub fn with_remote(remote: Box<dyn RemoteCompressor>) -> Self {
        Self {
            remote: Some(remote),
        }
    }

    /// Compress `bytes` according to `options`. Timing covers the whole
    /// operation including the hybrid retry.
    pub fn compress(&self, bytes: &[u8], options: &CompressionOptions) -> Result<CompressionResult> {
        let start = Instant::now();

        if options.target_size_kb == Some(0) {
            return Err(CompressError::Validation(
                "target_size_kb must be positive".to_string(),
            ));
        }

        // upstream clamps too, but never trust it
        let quality = options.quality.clamp(10, 100);
        let original_size = bytes.len() as u64;

        let (compressed_bytes, quality_used) = match options.method {
            CompressionMethod::Direct => (encode_from_bytes(bytes, quality, options)?, quality),
            CompressionMethod::Predicted => {
                let decoded = DecodedImage::from_bytes(bytes)?;
                let prediction =
                    quality_predictor::predict(original_size, decoded.width(), decoded.height());
                let predicted = prediction.optimal_quality;
                debug!(
                    requested = quality,
                    predicted,
                    confidence = prediction.confidence,
                    "Using predicted quality"
                );
                (encode_image(&decoded.image, predicted, options)?, predicted)
            }
            CompressionMethod::Hybrid => self.compress_hybrid(bytes, quality, options)?,
        };

        let compressed_size = compressed_bytes.len() as u64;
        let analysis = options
            .enable_analysis
            .then(|| quality_analyzer::analyze_quality(original_size, &compressed_bytes));

        Ok(CompressionResult {
            id: next_result_id(),
            original_size,
            compressed_size,
            compression_ratio: compression_ratio(original_size, compressed_size),
            quality_used,
            processing_time_ms: start.elapsed().as_millis() as u64,
            method: options.method,
            compressed_bytes,
            analysis,
        })
    }

    /// Remote first, local on any remote failure, then at most one
    /// quality-reduction retry when a size target is missed. A second
    /// oversize result is final.
    fn compress_hybrid(
        &self,
        bytes: &[u8],
        quality: u8,
        options: &CompressionOptions,
    ) -> Result<(Vec<u8>, u8)> {
        let remote_result = match &self.remote {
            Some(remote) => match remote.compress(bytes, quality) {
                Ok(out) => Some(out),
                Err(e) => {
                    warn!(error = %e, "Remote compression failed, falling back to local encoding");
                    None
                }
            },
            None => {
                debug!("No remote compressor configured, encoding locally");
                None
            }
        };

        let mut compressed = match remote_result {
            Some(out) => out,
            None => encode_from_bytes(bytes, quality, options)?,
        };
        let mut quality_used = quality;

        if let Some(target_kb) = options.target_size_kb {
            let limit = target_kb as u64 * 1024;
            if compressed.len() as u64 > limit {
                let retry_quality = quality.saturating_sub(10).max(10);
                debug!(
                    target_kb,
                    oversize = compressed.len(),
                    retry_quality,
                    "Size target missed, retrying once at reduced quality"
                );
                compressed = encode_from_bytes(bytes, retry_quality, options)?;
                quality_used = retry_quality;
            }
        }

        Ok((compressed, quality_used))
    }
}

fn encode_from_bytes(bytes: &[u8], quality: u8, options: &CompressionOptions) -> Result<Vec<u8>> {
    let decoded = DecodedImage::from_bytes(bytes)?;
    encode_image(&decoded.image, quality, options)
}

fn apply_resize_bounds(image: &DynamicImage, options: &CompressionOptions) -> Option<DynamicImage> {
    let (w, h) = (image.width(), image.height());
    let max_w = options.max_width.unwrap_or(w);
    let max_h = options.max_height.unwrap_or(h);
    if w <= max_w && h <= max_h {
        return None;
    }
    Some(image.resize(max_w, max_h, FilterType::Lanczos3))
}

/// Encode at the given quality. Quality shapes JPEG output only; PNG and
/// WebP encode losslessly.
fn encode_image(image: &DynamicImage, quality: u8, options: &CompressionOptions) -> Result<Vec<u8>> {
    let resized = apply_resize_bounds(image, options);
    let image = resized.as_ref().unwrap_or(image);

    let mut buf = Cursor::new(Vec::new());
    match options.output_format {
        OutputFormat::Jpeg | OutputFormat::Jpg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            image
                .to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| CompressError::Encode(format!("jpeg encode failed: {}", e)))?;
        }
        OutputFormat::Png => {
            image
                .write_to(&mut buf, ImageFormat::Png)
                .map_err(|e| CompressError::Encode(format!("png encode failed: {}", e)))?;
        }
        OutputFormat::Webp => {
            image
                .write_to(&mut buf, ImageFormat::WebP)
                .map_err(|e| CompressError::Encode(format!("webp encode failed: {}", e)))?;
        }
    }
    Ok(buf.into_inner())
}
