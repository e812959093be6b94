//! Centroid placement, spread validation and normal sampling for blobs.

use super::{Anisotropy, GaussianBlobConfig};
use crate::source::SyntheticError;
use rand::{Rng, rngs::SmallRng};
use std::f32::consts::PI;

pub(super) fn validate_blob_config(config: &GaussianBlobConfig) -> Result<(), SyntheticError> {
    if config.cluster_count == 0 {
        return Err(SyntheticError::ZeroClusters);
    }
    if config.cluster_count > config.point_count {
        return Err(SyntheticError::ClusterCountExceedsPointCount {
            cluster_count: config.cluster_count,
            point_count: config.point_count,
        });
    }
    if !config.separation.is_finite() || config.separation <= 0.0 {
        return Err(SyntheticError::InvalidSeparation {
            separation: config.separation,
        });
    }
    Ok(())
}

/// Places the centroids evenly on a circle in the first two axes so that
/// neighbouring centroids are `separation` apart. Remaining axes receive a
/// small seeded jitter.
#[expect(
    clippy::cast_precision_loss,
    reason = "centroid placement uses index-derived floating-point angles"
)]
#[expect(
    clippy::float_arithmetic,
    reason = "centroid placement uses trigonometric expressions"
)]
pub(super) fn build_blob_centroids(
    config: &GaussianBlobConfig,
    rng: &mut SmallRng,
) -> Vec<Vec<f32>> {
    let step = 2.0 * PI / config.cluster_count as f32;
    let radius = if config.cluster_count == 1 {
        0.0
    } else {
        config.separation / (2.0 * (step / 2.0).sin())
    };
    let jitter = 0.1 * config.separation;
    (0..config.cluster_count)
        .map(|cluster_index| {
            let angle = cluster_index as f32 * step;
            let mut centroid = vec![0.0_f32; config.dimensions];
            if let Some(value) = centroid.get_mut(0) {
                *value = radius * angle.cos();
            }
            if let Some(value) = centroid.get_mut(1) {
                *value = radius * angle.sin();
            }
            for value in centroid.iter_mut().skip(2) {
                *value = rng.gen_range(-jitter..jitter);
            }
            centroid
        })
        .collect()
}

pub(super) fn resolve_axis_scales(
    anisotropy: &Anisotropy,
    dimensions: usize,
) -> Result<Vec<f32>, SyntheticError> {
    match anisotropy {
        Anisotropy::Isotropic(scale) => {
            if !scale.is_finite() || *scale <= 0.0 {
                return Err(SyntheticError::InvalidScale { scale: *scale });
            }
            Ok(vec![*scale; dimensions])
        }
        Anisotropy::AxisScales(scales) => {
            if scales.len() != dimensions {
                return Err(SyntheticError::AxisScaleLengthMismatch {
                    expected: dimensions,
                    actual: scales.len(),
                });
            }
            if let Some(index) = scales
                .iter()
                .position(|value| !value.is_finite() || *value <= 0.0)
            {
                return Err(SyntheticError::InvalidAxisScale { index });
            }
            Ok(scales.clone())
        }
    }
}

/// Draws one standard normal sample with the Box-Muller transform.
#[expect(
    clippy::float_arithmetic,
    reason = "Box-Muller transform requires floating-point arithmetic"
)]
pub(super) fn standard_normal_sample(rng: &mut SmallRng) -> Result<f32, SyntheticError> {
    let u1 = rng.gen_range(f32::EPSILON..1.0_f32);
    let u2 = rng.gen_range(0.0_f32..1.0_f32);
    let sample = (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * PI * u2).cos();
    if sample.is_finite() {
        Ok(sample)
    } else {
        Err(SyntheticError::NonFiniteSample)
    }
}
