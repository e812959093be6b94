//! Seeded `f32` datasets served through [`VectorSource`].

mod generation;

use crate::source::SyntheticError;
use generation::{
    build_blob_centroids, resolve_axis_scales, standard_normal_sample, validate_blob_config,
};
use hdbstar_core::{VectorSource, VectorSourceError};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Shape of a dataset drawn uniformly from the unit hypercube.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Rows in the dataset.
    pub point_count: usize,
    /// Coordinates per row.
    pub dimensions: usize,
    /// Generator seed.
    pub seed: u64,
}

/// Per-axis spread of every blob.
#[derive(Clone, Debug)]
pub enum Anisotropy {
    /// One standard deviation shared by every axis.
    Isotropic(f32),
    /// One standard deviation per axis.
    AxisScales(Vec<f32>),
}

/// Shape of a Gaussian blob dataset.
#[derive(Clone, Debug)]
pub struct GaussianBlobConfig {
    /// Rows in the dataset.
    pub point_count: usize,
    /// Coordinates per row.
    pub dimensions: usize,
    /// Number of blobs.
    pub cluster_count: usize,
    /// Distance between neighbouring centroids.
    pub separation: f32,
    /// Spread of each blob around its centroid.
    pub anisotropy: Anisotropy,
    /// Generator seed.
    pub seed: u64,
}

/// A row-major `f32` [`VectorSource`] filled by a seeded generator.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    data: Vec<f32>,
    point_count: usize,
    dimensions: usize,
    name: &'static str,
}

impl SyntheticSource {
    /// Draws every coordinate uniformly from `[0.0, 1.0)`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when either dimension of the shape is zero
    /// or the buffer size overflows.
    pub fn generate(config: &SyntheticConfig) -> Result<Self, SyntheticError> {
        let total = checked_total(config.point_count, config.dimensions)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let data: Vec<f32> = (0..total)
            .map(|_| rng.gen_range(0.0_f32..1.0_f32))
            .collect();

        Self::from_parts(
            "synthetic-uniform",
            data,
            config.point_count,
            config.dimensions,
        )
    }

    /// Draws points around evenly spaced centroids.
    ///
    /// # Errors
    /// See [`Self::generate_gaussian_blobs_with_labels`].
    pub fn generate_gaussian_blobs(config: &GaussianBlobConfig) -> Result<Self, SyntheticError> {
        Self::generate_gaussian_blobs_with_labels(config).map(|(source, _labels)| source)
    }

    /// Generates Gaussian blobs and returns the generating centroid of each
    /// point.
    ///
    /// Points are assigned to centroids round-robin, so point `i` belongs to
    /// blob `i % cluster_count`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the shape is empty, there are more
    /// blobs than points, or a separation or spread is not finite and
    /// positive.
    #[expect(
        clippy::float_arithmetic,
        reason = "Gaussian data generation requires floating-point arithmetic"
    )]
    pub fn generate_gaussian_blobs_with_labels(
        config: &GaussianBlobConfig,
    ) -> Result<(Self, Vec<usize>), SyntheticError> {
        let total = checked_total(config.point_count, config.dimensions)?;
        validate_blob_config(config)?;

        let scales = resolve_axis_scales(&config.anisotropy, config.dimensions)?;
        let centroids = build_blob_centroids(config, &mut SmallRng::seed_from_u64(config.seed));
        let mut rng = SmallRng::seed_from_u64(config.seed ^ 0xA5A5_A5A5_A5A5_A5A5_u64);
        let mut data = Vec::with_capacity(total);
        let mut labels = Vec::with_capacity(config.point_count);
        for (label, centroid) in (0..config.cluster_count)
            .zip(&centroids)
            .cycle()
            .take(config.point_count)
        {
            labels.push(label);
            for (centre, scale) in centroid.iter().zip(&scales) {
                data.push(*centre + standard_normal_sample(&mut rng)? * *scale);
            }
        }

        let source = Self::from_parts(
            "synthetic-gaussian-blobs",
            data,
            config.point_count,
            config.dimensions,
        )?;
        Ok((source, labels))
    }

    /// Returns the row-major coordinate buffer.
    #[must_use]
    #[rustfmt::skip]
    pub fn data(&self) -> &[f32] { &self.data }

    fn from_parts(
        name: &'static str,
        data: Vec<f32>,
        point_count: usize,
        dimensions: usize,
    ) -> Result<Self, SyntheticError> {
        let expected = checked_total(point_count, dimensions)?;
        if data.len() != expected {
            return Err(SyntheticError::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            point_count,
            dimensions,
            name,
        })
    }
}

impl VectorSource for SyntheticSource {
    type Coordinate = f32;

    #[rustfmt::skip]
    fn len(&self) -> usize { self.point_count }

    #[rustfmt::skip]
    fn name(&self) -> &str { self.name }

    #[rustfmt::skip]
    fn dimension(&self) -> usize { self.dimensions }

    fn vector(&self, index: usize) -> Result<&[f32], VectorSourceError> {
        if index >= self.point_count {
            return Err(VectorSourceError::OutOfBounds { index });
        }
        let start = index
            .checked_mul(self.dimensions)
            .ok_or(VectorSourceError::OutOfBounds { index })?;
        let end = start
            .checked_add(self.dimensions)
            .ok_or(VectorSourceError::OutOfBounds { index })?;
        self.data
            .get(start..end)
            .ok_or(VectorSourceError::OutOfBounds { index })
    }
}

/// Validates the shape and returns `point_count * dimensions`.
fn checked_total(point_count: usize, dimensions: usize) -> Result<usize, SyntheticError> {
    if point_count == 0 {
        return Err(SyntheticError::ZeroPoints);
    }
    if dimensions == 0 {
        return Err(SyntheticError::ZeroDimensions);
    }
    point_count
        .checked_mul(dimensions)
        .ok_or(SyntheticError::Overflow)
}
