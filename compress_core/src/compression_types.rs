//! Shared Compression Types
//!
//! Data model for the engine: options in, result out, plus the decoded
//! image wrapper used by analysis. All records derive serde so embedding
//! callers can shuttle them across their own boundary.

use crate::errors::{CompressError, Result};
use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Compression execution path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionMethod {
    /// Decode and re-encode locally at the requested quality
    Direct,
    /// Let the quality predictor pick the quality, then encode locally
    Predicted,
    /// Try the remote compression service, fall back to Direct
    Hybrid,
}

impl CompressionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionMethod::Direct => "direct",
            CompressionMethod::Predicted => "predicted",
            CompressionMethod::Hybrid => "hybrid",
        }
    }
}

/// Requested output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    /// Alias accepted for caller convenience; encodes identically to Jpeg
    Jpg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg | OutputFormat::Jpg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Webp => ImageFormat::WebP,
        }
    }
}

/// Unified compression options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionOptions {
    pub method: CompressionMethod,
    /// Requested quality, clamped to 10..=100 at the engine entry
    pub quality: u8,
    /// Soft size target; one quality-reduction retry when exceeded
    pub target_size_kb: Option<u32>,
    /// Attach a quality analysis to the result
    pub enable_analysis: bool,
    /// Downscale bound, aspect ratio preserved
    pub max_width: Option<u32>,
    /// Downscale bound, aspect ratio preserved
    pub max_height: Option<u32>,
    pub output_format: OutputFormat,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            method: CompressionMethod::Direct,
            quality: 80,
            target_size_kb: None,
            enable_analysis: false,
            max_width: None,
            max_height: None,
            output_format: OutputFormat::Jpeg,
        }
    }
}

/// Decoded pixels plus the sniffed source format. Immutable during analysis.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
}

impl DecodedImage {
    /// Decode from raw bytes, sniffing the format from content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_hint(bytes, None)
    }

    /// Decode from raw bytes. When content sniffing fails, fall back to the
    /// extension of `filename_hint` to pick a decoder.
    pub fn from_bytes_with_hint(bytes: &[u8], filename_hint: Option<&str>) -> Result<Self> {
        let sniffed = image::guess_format(bytes).ok();

        let format = sniffed.or_else(|| {
            filename_hint
                .and_then(|name| Path::new(name).extension())
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
        });

        let image = match format {
            Some(fmt) => image::load_from_memory_with_format(bytes, fmt)
                .map_err(|e| CompressError::Decode(format!("{} decode failed: {}", fmt.to_mime_type(), e)))?,
            None => image::load_from_memory(bytes)
                .map_err(|e| CompressError::Decode(format!("unrecognized image data: {}", e)))?,
        };

        Ok(Self { image, format })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    pub fn format_name(&self) -> &'static str {
        match self.format {
            Some(ImageFormat::Jpeg) => "jpeg",
            Some(ImageFormat::Png) => "png",
            Some(ImageFormat::WebP) => "webp",
            Some(ImageFormat::Gif) => "gif",
            Some(ImageFormat::Tiff) => "tiff",
            Some(ImageFormat::Bmp) => "bmp",
            _ => "unknown",
        }
    }
}

/// Quality analysis attached to a result when requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAnalysisResult {
    pub psnr: f64,
    pub ssim: f64,
    pub mse: f64,
    pub entropy: f64,
    pub color_histogram_similarity: f64,
    pub edge_preservation: f64,
}

/// Outcome of a single compression call. Created fresh per call, never
/// mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionResult {
    pub id: String,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Size reduction in percent, rounded to two decimals
    pub compression_ratio: f64,
    pub quality_used: u8,
    pub processing_time_ms: u64,
    pub method: CompressionMethod,
    pub compressed_bytes: Vec<u8>,
    pub analysis: Option<QualityAnalysisResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
        }));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_options_default() {
        let opts = CompressionOptions::default();
        assert_eq!(opts.quality, 80);
        assert_eq!(opts.method, CompressionMethod::Direct);
        assert_eq!(opts.output_format, OutputFormat::Jpeg);
        assert!(opts.target_size_kb.is_none());
        assert!(!opts.enable_analysis);
    }

    #[test]
    fn test_output_format_mapping() {
        assert_eq!(OutputFormat::Jpeg.image_format(), ImageFormat::Jpeg);
        assert_eq!(OutputFormat::Jpg.image_format(), ImageFormat::Jpeg);
        assert_eq!(OutputFormat::Png.image_format(), ImageFormat::Png);
        assert_eq!(OutputFormat::Webp.image_format(), ImageFormat::WebP);
    }

    #[test]
    fn test_method_serde_tags() {
        let json = serde_json::to_string(&CompressionMethod::Hybrid).unwrap();
        assert_eq!(json, "\"hybrid\"");
        let json = serde_json::to_string(&OutputFormat::Webp).unwrap();
        assert_eq!(json, "\"webp\"");
    }

    #[test]
    fn test_decode_png_from_bytes() {
        let bytes = png_bytes(32, 16);
        let decoded = DecodedImage::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.height(), 16);
        assert_eq!(decoded.format, Some(ImageFormat::Png));
        assert_eq!(decoded.format_name(), "png");
        assert!(!decoded.has_alpha());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = DecodedImage::from_bytes(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(result, Err(CompressError::Decode(_))));
    }

    #[test]
    fn test_decode_from_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.png");
        std::fs::write(&path, png_bytes(12, 12)).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let decoded = DecodedImage::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.width(), 12);
    }

    #[test]
    fn test_filename_hint_used_when_sniffing_fails() {
        // Valid PNG body with the signature stripped defeats sniffing; the
        // hint alone cannot save a truncated stream, so decode still fails,
        // but the error path goes through the hinted decoder.
        let mut bytes = png_bytes(8, 8);
        bytes.drain(..8);
        let result = DecodedImage::from_bytes_with_hint(&bytes, Some("photo.png"));
        assert!(result.is_err());
    }
}
