//! Euclidean distance provider over a validated point-vector source.
//!
//! [`Distances`] borrows every row of a [`VectorSource`] once and checks its
//! dimensionality and finiteness up front, in parallel. Every later distance
//! query is therefore infallible. All comparisons inside the engine happen
//! on squared distances accumulated in `f64`; the square root is only taken
//! when a distance leaves the engine.

use std::sync::Arc;

use crate::{
    Coordinate, Result, VectorSource,
    error::{HdbscanError, VectorSourceError},
    execution::{Execution, Phase},
    kdtree::Aabb,
};

/// Squared Euclidean distance between two equal-length rows.
///
/// # Examples
/// ```
/// use hdbstar_core::squared_euclidean;
///
/// assert_eq!(squared_euclidean(&[1.0_f32, 2.0], &[4.0, 6.0]), 25.0);
/// ```
#[must_use]
pub fn squared_euclidean<T: Coordinate>(left: &[T], right: &[T]) -> f64 {
    let mut sum = 0.0_f64;
    for (&l, &r) in left.iter().zip(right) {
        let diff = l.to_f64() - r.to_f64();
        sum += diff * diff;
    }
    sum
}

/// Validated, read-only view over the rows of a [`VectorSource`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use hdbstar_core::{Distances, Execution, SilentProgress, TerminationFlag, VectorSource, VectorSourceError};
///
/// struct Line(Vec<[f64; 1]>);
///
/// impl VectorSource for Line {
///     type Coordinate = f64;
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn dimension(&self) -> usize { 1 }
///     fn vector(&self, index: usize) -> Result<&[f64], VectorSourceError> {
///         self.0.get(index).map(|row| row.as_slice()).ok_or(VectorSourceError::OutOfBounds { index })
///     }
/// }
///
/// let execution = Execution::new(1, TerminationFlag::running(), Arc::new(SilentProgress))?;
/// let source = Line(vec![[0.0], [3.0]]);
/// let distances = Distances::new(&source, &execution)?;
/// assert_eq!(distances.squared(0, 1), 9.0);
/// assert_eq!(distances.distance(0, 1), 3.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Distances<'a, T> {
    rows: Vec<&'a [T]>,
    dimension: usize,
}

impl<'a, T: Coordinate> Distances<'a, T> {
    /// Borrows and validates every row of `source`.
    ///
    /// # Errors
    /// Returns [`HdbscanError::VectorSource`] when the source is empty,
    /// reports a zero dimension, fails to yield a row, yields a row of the
    /// wrong length, or contains a non-finite coordinate. Returns
    /// [`HdbscanError::Cancelled`] when the run is cancelled mid-validation.
    pub fn new<S>(source: &'a S, execution: &Execution) -> Result<Self>
    where
        S: VectorSource<Coordinate = T>,
    {
        let wrap = |error: VectorSourceError| HdbscanError::VectorSource {
            data_source: Arc::from(source.name()),
            error,
        };
        let dimension = source.dimension();
        if source.is_empty() {
            return Err(wrap(VectorSourceError::EmptyData));
        }
        if dimension == 0 {
            return Err(wrap(VectorSourceError::ZeroDimension));
        }

        let chunks = execution.run_partitioned(Phase::Validation, source.len(), |range| {
            range
                .map(|index| {
                    let row = source.vector(index)?;
                    validate_row(index, row, dimension)?;
                    Ok(row)
                })
                .collect::<core::result::Result<Vec<_>, VectorSourceError>>()
                .map_err(wrap)
        })?;

        Ok(Self {
            rows: chunks.into_iter().flatten().collect(),
            dimension,
        })
    }

    /// Returns the number of points.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.rows.len() }

    /// Returns `true` when the view holds no points.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Returns the shared dimensionality of every row.
    #[must_use]
    #[rustfmt::skip]
    pub fn dimension(&self) -> usize { self.dimension }

    /// Borrows the coordinates of point `index`.
    ///
    /// # Panics
    /// Panics when `index >= self.len()`.
    #[must_use]
    pub fn row(&self, index: usize) -> &'a [T] {
        self.rows[index]
    }

    /// Returns coordinate `dimension` of point `index`, widened to `f64`.
    ///
    /// # Panics
    /// Panics when either index is out of range.
    #[must_use]
    pub fn coordinate(&self, index: usize, dimension: usize) -> f64 {
        self.rows[index][dimension].to_f64()
    }

    /// Squared Euclidean distance between points `left` and `right`.
    ///
    /// # Panics
    /// Panics when either index is out of range.
    #[must_use]
    pub fn squared(&self, left: usize, right: usize) -> f64 {
        squared_euclidean(self.rows[left], self.rows[right])
    }

    /// Euclidean distance between points `left` and `right`.
    ///
    /// # Panics
    /// Panics when either index is out of range.
    #[must_use]
    pub fn distance(&self, left: usize, right: usize) -> f64 {
        self.squared(left, right).sqrt()
    }

    /// Squared Euclidean distance between point `index` and a free vector of
    /// the same dimension.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    #[must_use]
    pub fn squared_to_vector(&self, index: usize, query: &[T]) -> f64 {
        squared_euclidean(self.rows[index], query)
    }

    /// Squared lower bound on the distance from point `index` to anything
    /// inside `aabb`. Never overestimates.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    #[must_use]
    pub fn lower_bound_squared(&self, aabb: &Aabb, index: usize) -> f64 {
        aabb.lower_bound_squared(self.rows[index])
    }

    /// Squared lower bound on the distance between any point of `left` and
    /// any point of `right`.
    #[must_use]
    pub fn box_lower_bound_squared(&self, left: &Aabb, right: &Aabb) -> f64 {
        left.lower_bound_squared_to_box(right)
    }
}

fn validate_row<T: Coordinate>(
    index: usize,
    row: &[T],
    dimension: usize,
) -> core::result::Result<(), VectorSourceError> {
    if row.len() != dimension {
        return Err(VectorSourceError::DimensionMismatch {
            index,
            expected: dimension,
            actual: row.len(),
        });
    }
    if let Some(position) = row.iter().position(|value| !value.is_finite_value()) {
        return Err(VectorSourceError::NonFinite {
            index,
            dimension: position,
        });
    }
    Ok(())
}
