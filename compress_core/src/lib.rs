//! Adaptive Image Compression Engine
//!
//! This crate analyzes raw image bytes and compresses them adaptively:
//! - Sampled content metrics (complexity, noise, edges, palette, entropy)
//! - Deterministic strategy selection from those metrics
//! - Quality prediction (linear regressor with a rule-based fallback)
//! - Direct / predicted / hybrid compression with a single size-target retry
//! - Cheap post-compression quality proxies
//!
//! The boundary layer (HTTP, persistence) lives outside this crate; it calls
//! [`analyze`], [`validate`] and [`CompressionEngine::compress`] and shuttles
//! the serde-serializable records.

pub mod compression_types;
pub mod engine;
pub mod errors;
pub mod image_analyzer;
pub mod image_metrics;
pub mod logging;
pub mod pixel_sampler;
pub mod quality_analyzer;
pub mod quality_predictor;
pub mod remote_compressor;
pub mod strategy;

pub use compression_types::{
    CompressionMethod, CompressionOptions, CompressionResult, DecodedImage, OutputFormat,
    QualityAnalysisResult,
};
pub use engine::CompressionEngine;
pub use errors::{CompressError, Result};
pub use image_analyzer::{analyze, supported_formats, validate, ImageAnalysis};
pub use image_metrics::ImageMetricsResult;
pub use quality_predictor::CompressionPrediction;
pub use remote_compressor::{HttpCompressor, RemoteCompressor};
pub use strategy::CompressionStrategy;
