//! Axis-aligned bounding boxes and the pruning bounds derived from them.

use rayon::prelude::*;

use crate::{Coordinate, Distances, Execution};

/// Ranges at least this long have their boxes computed on the worker pool.
pub(super) const PARALLEL_AABB_THRESHOLD: usize = 4_096;

const AABB_CHUNK: usize = 1_024;

/// Axis-aligned bounding box over a set of points.
///
/// Once built from at least one point, `min[d] <= max[d]` holds for every
/// dimension. Bounds are stored in `f64` so single- and double-precision
/// sources share one representation.
#[derive(Clone, Debug, PartialEq)]
pub struct Aabb {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Aabb {
    fn empty(dimension: usize) -> Self {
        Self {
            min: vec![f64::INFINITY; dimension],
            max: vec![f64::NEG_INFINITY; dimension],
        }
    }

    /// Builds the tightest box containing the points in `ids`.
    ///
    /// # Panics
    /// Panics when an id is out of range for `distances`.
    #[must_use]
    pub fn covering<T: Coordinate>(distances: &Distances<'_, T>, ids: &[usize]) -> Self {
        let mut aabb = Self::empty(distances.dimension());
        for &id in ids {
            aabb.include(distances.row(id));
        }
        aabb
    }

    /// Builds the box for `ids`, splitting the scan across the worker pool
    /// when the range is large.
    pub(super) fn covering_parallel<T: Coordinate>(
        distances: &Distances<'_, T>,
        ids: &[usize],
        execution: &Execution,
    ) -> Self {
        if ids.len() < PARALLEL_AABB_THRESHOLD {
            return Self::covering(distances, ids);
        }
        let dimension = distances.dimension();
        execution.install(|| {
            ids.par_chunks(AABB_CHUNK)
                .map(|chunk| Self::covering(distances, chunk))
                .reduce(|| Self::empty(dimension), Self::merge)
        })
    }

    fn include<T: Coordinate>(&mut self, row: &[T]) {
        for ((low, high), &value) in self.min.iter_mut().zip(&mut self.max).zip(row) {
            let value = value.to_f64();
            *low = low.min(value);
            *high = high.max(value);
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (low, other_low) in self.min.iter_mut().zip(&other.min) {
            *low = low.min(*other_low);
        }
        for (high, other_high) in self.max.iter_mut().zip(&other.max) {
            *high = high.max(*other_high);
        }
        self
    }

    /// Returns the number of dimensions.
    #[must_use]
    #[rustfmt::skip]
    pub fn dimension(&self) -> usize { self.min.len() }

    /// Returns the per-dimension lower corner.
    #[must_use]
    #[rustfmt::skip]
    pub fn min(&self) -> &[f64] { &self.min }

    /// Returns the per-dimension upper corner.
    #[must_use]
    #[rustfmt::skip]
    pub fn max(&self) -> &[f64] { &self.max }

    /// Returns `max[d] - min[d]` for `dimension`.
    ///
    /// # Panics
    /// Panics when `dimension` is out of range.
    #[must_use]
    pub fn spread(&self, dimension: usize) -> f64 {
        self.max[dimension] - self.min[dimension]
    }

    /// Returns the dimension with the largest spread, preferring the lowest
    /// index among ties.
    #[must_use]
    pub fn widest_dimension(&self) -> usize {
        let mut widest = 0;
        let mut best = f64::NEG_INFINITY;
        for dimension in 0..self.dimension() {
            let spread = self.spread(dimension);
            if spread > best {
                best = spread;
                widest = dimension;
            }
        }
        widest
    }

    /// Returns `true` when `point` lies inside the box (boundary included).
    #[must_use]
    pub fn contains<T: Coordinate>(&self, point: &[T]) -> bool {
        self.min
            .iter()
            .zip(&self.max)
            .zip(point)
            .all(|((&low, &high), &value)| {
                let value = value.to_f64();
                low <= value && value <= high
            })
    }

    /// Squared lower bound on the distance from `point` to any point the box
    /// could contain.
    ///
    /// Each per-dimension gap is rounded the same way as the corresponding
    /// coordinate difference in [`crate::squared_euclidean`], so the bound
    /// never exceeds a computed distance to a contained point.
    #[must_use]
    pub fn lower_bound_squared<T: Coordinate>(&self, point: &[T]) -> f64 {
        let mut sum = 0.0_f64;
        for ((&low, &high), &value) in self.min.iter().zip(&self.max).zip(point) {
            let value = value.to_f64();
            let gap = if value < low {
                low - value
            } else if value > high {
                value - high
            } else {
                0.0
            };
            sum += gap * gap;
        }
        sum
    }

    /// Squared lower bound on the distance between any point of `self` and
    /// any point of `other`.
    #[must_use]
    pub fn lower_bound_squared_to_box(&self, other: &Self) -> f64 {
        let mut sum = 0.0_f64;
        for dimension in 0..self.dimension().min(other.dimension()) {
            let gap = if other.max[dimension] < self.min[dimension] {
                self.min[dimension] - other.max[dimension]
            } else if self.max[dimension] < other.min[dimension] {
                other.min[dimension] - self.max[dimension]
            } else {
                0.0
            };
            sum += gap * gap;
        }
        sum
    }
}
