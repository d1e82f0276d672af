//! Image Content Metrics
//!
//! Sampled single-image statistics that drive strategy selection:
//! complexity, noise, edge density, dominant colors, and byte entropy.
//! The four pixel metrics are independent reads of the decoded image and
//! run in parallel; entropy looks only at the raw encoded buffer.

use crate::pixel_sampler::SampleGrid;
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const COMPLEXITY_STRIDE: u32 = 10;
const NOISE_STRIDE: u32 = 10;
const COLOR_STRIDE: u32 = 20;
const EDGE_STRIDE: u32 = 5;

/// Gradient magnitude above this counts as an edge.
const EDGE_THRESHOLD: f64 = 100.0;
/// Worst-case per-pixel squared channel deviation: 255^2 per channel, 3 channels.
const CHANNEL_NORM: f64 = 255.0 * 255.0 * 3.0;
const MAX_DOMINANT_COLORS: usize = 5;

const DEFAULT_COMPLEXITY: f64 = 0.5;
const DEFAULT_NOISE: f64 = 0.3;
const DEFAULT_EDGE_DENSITY: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetricsResult {
    /// Sampled color variance, normalized to [0, 1]
    pub complexity: f64,
    /// Deviation from the 4-neighbor mean, normalized to [0, 1]
    pub noise_level: f64,
    /// Fraction of sampled positions with a strong gradient, [0, 1]
    pub edge_density: f64,
    /// Up to five quantized `#RRGGBB` buckets, most frequent first
    pub dominant_colors: Vec<String>,
    /// Shannon entropy of the raw encoded bytes, [0, 8]
    pub entropy: f64,
}

/// Compute all metrics for a decoded image and its raw encoded bytes.
pub fn compute_metrics(image: &DynamicImage, raw_bytes: &[u8]) -> ImageMetricsResult {
    let rgb = image.to_rgb8();

    let ((complexity, noise_level), (edge_density, dominant_colors)) = rayon::join(
        || rayon::join(|| sampled_complexity(&rgb), || sampled_noise(&rgb)),
        || {
            rayon::join(
                || sampled_edge_density(&rgb),
                || sampled_dominant_colors(&rgb),
            )
        },
    );

    ImageMetricsResult {
        complexity,
        noise_level,
        edge_density,
        dominant_colors,
        entropy: byte_entropy(raw_bytes),
    }
}

fn sampled_complexity(rgb: &RgbImage) -> f64 {
    let grid = SampleGrid::new(rgb.width(), rgb.height(), COMPLEXITY_STRIDE);
    let samples: Vec<&Rgb<u8>> = grid.coords().map(|(x, y)| rgb.get_pixel(x, y)).collect();
    if samples.is_empty() {
        return DEFAULT_COMPLEXITY;
    }

    let n = samples.len() as f64;
    let mut mean = [0.0f64; 3];
    for p in &samples {
        for (c, m) in mean.iter_mut().enumerate() {
            *m += p[c] as f64;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut squared_dev = 0.0;
    for p in &samples {
        for (c, m) in mean.iter().enumerate() {
            let d = p[c] as f64 - m;
            squared_dev += d * d;
        }
    }

    (squared_dev / n / CHANNEL_NORM).clamp(0.0, 1.0)
}

fn sampled_noise(rgb: &RgbImage) -> f64 {
    let (w, h) = rgb.dimensions();
    let grid = SampleGrid::new(w, h, NOISE_STRIDE);

    let mut squared_diff = 0.0;
    let mut count = 0usize;
    for (x, y) in grid.coords() {
        // 1-px border has no full 4-neighborhood
        if x == 0 || y == 0 || x + 1 >= w || y + 1 >= h {
            continue;
        }
        let p = rgb.get_pixel(x, y);
        let neighbors = [
            rgb.get_pixel(x - 1, y),
            rgb.get_pixel(x + 1, y),
            rgb.get_pixel(x, y - 1),
            rgb.get_pixel(x, y + 1),
        ];
        for c in 0..3 {
            let avg = neighbors.iter().map(|nb| nb[c] as f64).sum::<f64>() / 4.0;
            let d = p[c] as f64 - avg;
            squared_diff += d * d;
        }
        count += 1;
    }

    if count == 0 {
        return DEFAULT_NOISE;
    }
    (squared_diff / count as f64 / CHANNEL_NORM).clamp(0.0, 1.0)
}

fn channel_sum(p: &Rgb<u8>) -> f64 {
    p[0] as f64 + p[1] as f64 + p[2] as f64
}

fn sampled_edge_density(rgb: &RgbImage) -> f64 {
    let (w, h) = rgb.dimensions();
    let grid = SampleGrid::new(w, h, EDGE_STRIDE);

    let mut edges = 0usize;
    let mut samples = 0usize;
    for (x, y) in grid.coords() {
        if x + 1 >= w || y + 1 >= h {
            continue;
        }
        let here = channel_sum(rgb.get_pixel(x, y));
        let gx = here - channel_sum(rgb.get_pixel(x + 1, y));
        let gy = here - channel_sum(rgb.get_pixel(x, y + 1));
        let magnitude = (gx * gx + gy * gy).sqrt();
        samples += 1;
        if magnitude > EDGE_THRESHOLD {
            edges += 1;
        }
    }

    if samples == 0 {
        return DEFAULT_EDGE_DENSITY;
    }
    (edges as f64 / samples as f64).clamp(0.0, 1.0)
}

fn sampled_dominant_colors(rgb: &RgbImage) -> Vec<String> {
    let grid = SampleGrid::new(rgb.width(), rgb.height(), COLOR_STRIDE);

    // bucket -> (frequency, first-seen order) so ties rank by encounter order
    let mut buckets: HashMap<(u8, u8, u8), (usize, usize)> = HashMap::new();
    for (order, (x, y)) in grid.coords().enumerate() {
        let p = rgb.get_pixel(x, y);
        let key = (p[0] - p[0] % 32, p[1] - p[1] % 32, p[2] - p[2] % 32);
        buckets.entry(key).or_insert((0, order)).0 += 1;
    }

    let mut ranked: Vec<_> = buckets.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(MAX_DOMINANT_COLORS)
        .map(|((r, g, b), _)| format!("#{:02X}{:02X}{:02X}", r, g, b))
        .collect()
}

/// Shannon entropy over the byte histogram of `bytes`, in bits per byte.
pub fn byte_entropy(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }

    let mut histogram = [0u64; 256];
    for &b in bytes {
        histogram[b as usize] += 1;
    }

    let total = bytes.len() as f64;
    let mut entropy = 0.0;
    for &count in &histogram {
        if count > 0 {
            let p = count as f64 / total;
            entropy -= p * p.log2();
        }
    }
    entropy
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use proptest::prelude::*;

    fn flat(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
            image::Rgb([value, value, value])
        }))
    }

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        }))
    }

    #[test]
    fn test_flat_image_is_calm() {
        let img = flat(100, 100, 128);
        let metrics = compute_metrics(&img, &[128; 64]);
        assert_eq!(metrics.complexity, 0.0);
        assert_eq!(metrics.noise_level, 0.0);
        assert_eq!(metrics.edge_density, 0.0);
        assert_eq!(metrics.dominant_colors, vec!["#808080".to_string()]);
    }

    #[test]
    fn test_checkerboard_is_busy() {
        // 1-px checkerboard: every sampled position sits next to its inverse,
        // but the stride-10 complexity grid only ever lands on one parity
        let img = checkerboard(100, 100);
        let metrics = compute_metrics(&img, &[0; 16]);
        assert!(metrics.noise_level > 0.2);
        assert!(metrics.edge_density > 0.5);
    }

    #[test]
    fn test_block_pattern_raises_complexity() {
        // 10-px blocks alternate exactly at the complexity sampling stride
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(100, 100, |x, y| {
            if (x / 10 + y / 10) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        }));
        let metrics = compute_metrics(&img, &[0; 16]);
        assert!(metrics.complexity > 0.2);
    }

    #[test]
    fn test_defaults_when_nothing_sampled() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let metrics = compute_metrics(&img, &[]);
        assert_eq!(metrics.complexity, 0.5);
        assert_eq!(metrics.noise_level, 0.3);
        assert_eq!(metrics.edge_density, 0.4);
        assert!(metrics.dominant_colors.is_empty());
        assert_eq!(metrics.entropy, 0.0);
    }

    #[test]
    fn test_noise_default_for_single_pixel() {
        // No interior samples, but the lone pixel is still sampled elsewhere
        let img = flat(1, 1, 10);
        let metrics = compute_metrics(&img, &[1, 2, 3]);
        assert_eq!(metrics.noise_level, 0.3);
        assert_eq!(metrics.dominant_colors, vec!["#000000".to_string()]);
    }

    #[test]
    fn test_dominant_colors_capped_at_five() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(200, 200, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }));
        let metrics = compute_metrics(&img, &[0]);
        assert!(!metrics.dominant_colors.is_empty());
        assert!(metrics.dominant_colors.len() <= 5);
        for color in &metrics.dominant_colors {
            assert!(color.starts_with('#'));
            assert_eq!(color.len(), 7);
        }
    }

    #[test]
    fn test_dominant_color_ordering() {
        // 3 of 4 sampled positions (stride 20 over 40x40: (0,0),(20,0),(0,20),(20,20))
        // land in the dark bucket
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(40, 40, |x, y| {
            if x == 20 && y == 20 {
                image::Rgb([250, 250, 250])
            } else {
                image::Rgb([5, 5, 5])
            }
        }));
        let metrics = compute_metrics(&img, &[0]);
        assert_eq!(metrics.dominant_colors[0], "#000000");
        assert_eq!(metrics.dominant_colors[1], "#E0E0E0");
    }

    #[test]
    fn test_entropy_zero_for_constant_buffer() {
        assert_eq!(byte_entropy(&[0u8; 4096]), 0.0);
        assert_eq!(byte_entropy(&[]), 0.0);
    }

    #[test]
    fn test_entropy_eight_for_uniform_bytes() {
        let buf: Vec<u8> = (0..=255u8).cycle().take(256 * 7).collect();
        let entropy = byte_entropy(&buf);
        assert!((entropy - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_entropy_single_byte() {
        assert_eq!(byte_entropy(&[42]), 0.0);
    }

    proptest! {
        #[test]
        fn prop_metric_bounds(w in 1u32..64, h in 1u32..64, seed in 0u8..=255) {
            let img = DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
                image::Rgb([
                    seed.wrapping_add((x * 7) as u8),
                    seed.wrapping_mul((y + 3) as u8),
                    seed ^ ((x + y) as u8),
                ])
            }));
            let metrics = compute_metrics(&img, &[seed; 33]);
            prop_assert!((0.0..=1.0).contains(&metrics.complexity));
            prop_assert!((0.0..=1.0).contains(&metrics.noise_level));
            prop_assert!((0.0..=1.0).contains(&metrics.edge_density));
            prop_assert!((0.0..=8.0).contains(&metrics.entropy));
            prop_assert!(!metrics.dominant_colors.is_empty());
            prop_assert!(metrics.dominant_colors.len() <= 5);
        }
    }
}
