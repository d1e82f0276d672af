//! Post-Compression Quality Proxies
//!
//! These are deliberately cheap estimates derived from the size ratio, not
//! pixel comparisons: good enough to rank results, not to certify them.
//! Entropy is the one exact figure (computed over the compressed bytes).

use crate::compression_types::QualityAnalysisResult;
use crate::image_metrics::byte_entropy;

const HISTOGRAM_SIMILARITY: f64 = 0.90;
const EDGE_PRESERVATION: f64 = 0.88;

pub fn analyze_quality(original_size: u64, compressed: &[u8]) -> QualityAnalysisResult {
    let ratio = if original_size == 0 {
        0.0
    } else {
        compressed.len() as f64 / original_size as f64
    };

    QualityAnalysisResult {
        psnr: 30.0 + 20.0 * ratio,
        ssim: 0.85 + 0.15 * ratio,
        mse: 100.0 - 50.0 * ratio,
        entropy: byte_entropy(compressed),
        color_histogram_similarity: HISTOGRAM_SIMILARITY,
        edge_preservation: EDGE_PRESERVATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_formulas() {
        let analysis = analyze_quality(1000, &[7u8; 400]);
        assert!((analysis.psnr - 38.0).abs() < 1e-9);
        assert!((analysis.ssim - 0.91).abs() < 1e-9);
        assert!((analysis.mse - 80.0).abs() < 1e-9);
        assert_eq!(analysis.entropy, 0.0);
        assert_eq!(analysis.color_histogram_similarity, 0.90);
        assert_eq!(analysis.edge_preservation, 0.88);
    }

    #[test]
    fn test_zero_original_size() {
        let analysis = analyze_quality(0, &[1, 2, 3]);
        assert!((analysis.psnr - 30.0).abs() < 1e-9);
        assert!((analysis.ssim - 0.85).abs() < 1e-9);
        assert!((analysis.mse - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_entropy_tracks_compressed_bytes() {
        let varied: Vec<u8> = (0..=255u8).collect();
        let analysis = analyze_quality(512, &varied);
        assert!((analysis.entropy - 8.0).abs() < 1e-9);
    }
}
