//! Compression Quality Prediction
//!
//! Two backends behind one entry point. The primary backend is a small
//! linear regressor trained once, lazily, on a seeded synthetic corpus; the
//! rule-based backend is always available and takes over on any training or
//! inference failure. Callers never see a predictor error.

use crate::compression_types::OutputFormat;
use anyhow::{bail, Result};
use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

const TRAINING_SEED: u64 = 0x5eed_cafe;
const TRAINING_SAMPLES: usize = 1000;
const FEATURES: usize = 4;
const EPOCHS: usize = 200;
const LEARNING_RATE: f64 = 0.01;

const MIN_QUALITY: f64 = 10.0;
const MAX_QUALITY: f64 = 95.0;
const MIN_RATIO: f64 = 0.1;
const MAX_RATIO: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionPrediction {
    pub optimal_quality: u8,
    pub predicted_compression_ratio: f64,
    pub confidence: f64,
    pub recommended_format: OutputFormat,
}

/// Linear regressor over `{width, height, aspect_ratio, file_size}` with
/// standardized features. Trained by deterministic full-batch gradient
/// descent, then read-only.
#[derive(Debug, Clone)]
struct RegressionModel {
    weights: [f64; FEATURES],
    bias: f64,
    feature_means: [f64; FEATURES],
    feature_stds: [f64; FEATURES],
}

lazy_static! {
    static ref REGRESSION_MODEL: Option<RegressionModel> = match RegressionModel::train() {
        Ok(model) => Some(model),
        Err(e) => {
            debug!(error = %e, "Regression training failed, rule-based predictions only");
            None
        }
    };
}

impl RegressionModel {
    fn train() -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(TRAINING_SEED);

        let mut features = Vec::with_capacity(TRAINING_SAMPLES);
        let mut labels = Vec::with_capacity(TRAINING_SAMPLES);
        for _ in 0..TRAINING_SAMPLES {
            let width: f64 = rng.random_range(100.0..=4000.0);
            let height: f64 = rng.random_range(100.0..=4000.0);
            let file_size: f64 = rng.random_range(50_000.0..=20_000_000.0);
            let complexity: f64 = rng.random();
            features.push([width, height, width / height, file_size]);
            labels.push(60.0 + complexity * 30.0);
        }

        let n = TRAINING_SAMPLES as f64;
        let mut means = [0.0f64; FEATURES];
        for row in &features {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = [0.0f64; FEATURES];
        for row in &features {
            for (s, (v, m)) in stds.iter_mut().zip(row.iter().zip(&means)) {
                let d = v - m;
                *s += d * d;
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
            if *s <= f64::EPSILON {
                bail!("degenerate feature column in training corpus");
            }
        }

        for row in &mut features {
            for ((v, m), s) in row.iter_mut().zip(&means).zip(&stds) {
                *v = (*v - m) / s;
            }
        }

        let mut weights = [0.0f64; FEATURES];
        let mut bias = 0.0f64;
        for _ in 0..EPOCHS {
            let mut weight_grads = [0.0f64; FEATURES];
            let mut bias_grad = 0.0f64;
            for (row, label) in features.iter().zip(&labels) {
                let pred: f64 =
                    bias + weights.iter().zip(row).map(|(w, v)| w * v).sum::<f64>();
                let err = pred - label;
                for (g, v) in weight_grads.iter_mut().zip(row) {
                    *g += err * v;
                }
                bias_grad += err;
            }
            for (w, g) in weights.iter_mut().zip(&weight_grads) {
                *w -= LEARNING_RATE * g / n;
            }
            bias -= LEARNING_RATE * bias_grad / n;
        }

        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            bail!("gradient descent diverged");
        }

        Ok(Self {
            weights,
            bias,
            feature_means: means,
            feature_stds: stds,
        })
    }

    fn raw_quality(&self, file_size: u64, width: u32, height: u32) -> f64 {
        let aspect = if height == 0 {
            f64::NAN
        } else {
            width as f64 / height as f64
        };
        let raw = [width as f64, height as f64, aspect, file_size as f64];

        let mut y = self.bias;
        for ((v, m), (s, w)) in raw
            .iter()
            .zip(&self.feature_means)
            .zip(self.feature_stds.iter().zip(&self.weights))
        {
            y += w * ((v - m) / s);
        }
        y
    }
}

/// Predict compression parameters for an image of the given encoded size and
/// dimensions. Infallible: degraded inputs land on the rule-based backend.
pub fn predict(file_size: u64, width: u32, height: u32) -> CompressionPrediction {
    if let Some(model) = REGRESSION_MODEL.as_ref() {
        let y = model.raw_quality(file_size, width, height);
        if y.is_finite() {
            let quality = y.clamp(MIN_QUALITY, MAX_QUALITY);
            let ratio = (0.9 - quality / 100.0 * 0.5).clamp(MIN_RATIO, MAX_RATIO);
            return CompressionPrediction {
                optimal_quality: quality.round() as u8,
                predicted_compression_ratio: ratio,
                confidence: 0.85,
                recommended_format: OutputFormat::Jpeg,
            };
        }
        debug!(
            file_size,
            width, height, "Non-finite regression output, falling back to rules"
        );
    }
    rule_based_prediction(file_size, width, height)
}

/// Deterministic heuristic backend.
pub fn rule_based_prediction(file_size: u64, width: u32, height: u32) -> CompressionPrediction {
    let mut quality: u8 = 80;
    if file_size > 5_000_000 {
        quality = 70;
    }
    if file_size < 500_000 {
        quality = 90;
    }
    let pixels = width as u64 * height as u64;
    if pixels > 8_000_000 {
        quality = quality.min(75);
    }

    CompressionPrediction {
        optimal_quality: quality,
        predicted_compression_ratio: 0.6,
        confidence: 0.7,
        recommended_format: OutputFormat::Jpeg,
    }
}
