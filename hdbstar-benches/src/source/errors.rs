//! Errors raised while generating synthetic benchmark datasets.

/// Rejected generator configurations.
#[derive(Debug, thiserror::Error)]
pub enum SyntheticError {
    /// No points were requested.
    #[error("a synthetic dataset needs at least one point")]
    ZeroPoints,
    /// Zero-dimensional points were requested.
    #[error("a synthetic dataset needs at least one dimension")]
    ZeroDimensions,
    /// No blobs were requested.
    #[error("a blob dataset needs at least one blob")]
    ZeroClusters,
    /// More blobs than points were requested.
    #[error("{cluster_count} blobs cannot be drawn from {point_count} points")]
    ClusterCountExceedsPointCount {
        /// Requested blobs.
        cluster_count: usize,
        /// Requested points.
        point_count: usize,
    },
    /// The coordinate buffer would not fit in memory.
    #[error("point_count * dimensions overflows usize")]
    Overflow,
    /// Centroid separation must be finite and positive.
    #[error("blob separation {separation} must be finite and greater than zero")]
    InvalidSeparation {
        /// Value supplied.
        separation: f32,
    },
    /// An isotropic spread must be finite and positive.
    #[error("blob spread {scale} must be finite and greater than zero")]
    InvalidScale {
        /// Value supplied.
        scale: f32,
    },
    /// A per-axis spread was non-positive or non-finite.
    #[error("spread of axis {index} must be finite and greater than zero")]
    InvalidAxisScale {
        /// Zero-based axis index.
        index: usize,
    },
    /// Per-axis spreads did not cover every dimension.
    #[error("expected {expected} axis spreads, got {actual}")]
    AxisScaleLengthMismatch {
        /// The dataset dimensionality.
        expected: usize,
        /// Spreads supplied.
        actual: usize,
    },
    /// The normal sampler produced a non-finite value.
    #[error("normal sampler produced a non-finite value")]
    NonFiniteSample,
    /// A generator filled the buffer with the wrong number of coordinates.
    #[error("generated {actual} coordinates, expected {expected}")]
    DataLengthMismatch {
        /// `point_count * dimensions`.
        expected: usize,
        /// Coordinates produced.
        actual: usize,
    },
}
