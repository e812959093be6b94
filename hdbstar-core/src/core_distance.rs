//! Per-point core distances derived from exact k-NN searches.

use std::num::NonZeroUsize;

use tracing::{debug, instrument};

use crate::{
    Coordinate, Distances,
    execution::{Execution, ExecutionError, Phase},
    kdtree::KdTree,
};

/// Core distance of every point, indexed by point id.
///
/// Values are held squared so the MST phase can compare them against squared
/// raw distances directly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoreDistances {
    squared: Vec<f64>,
}

impl CoreDistances {
    /// Wraps precomputed squared core distances.
    #[must_use]
    pub fn from_squared(squared: Vec<f64>) -> Self {
        Self { squared }
    }

    /// Returns the core distance of `point`.
    ///
    /// # Panics
    /// Panics when `point` is out of range.
    #[must_use]
    pub fn get(&self, point: usize) -> f64 {
        self.squared[point].sqrt()
    }

    /// Returns the squared core distance of `point`.
    ///
    /// # Panics
    /// Panics when `point` is out of range.
    #[must_use]
    pub fn squared(&self, point: usize) -> f64 {
        self.squared[point]
    }

    /// Returns the number of points.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.squared.len() }

    /// Returns `true` when no point is covered.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.squared.is_empty() }

    /// Iterates over core distances in point order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.squared.iter().map(|value| value.sqrt())
    }

    /// Copies the core distances into a vector indexed by point id.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    pub(crate) fn squared_values(&self) -> &[f64] {
        &self.squared
    }
}

/// Computes the distance from every point to its `samples`-th nearest
/// neighbour, excluding the point itself.
///
/// When fewer than `samples` other points exist the farthest one is used,
/// and a lone point has core distance zero. Searches are independent and run
/// in parallel over contiguous id ranges.
///
/// # Errors
/// Returns [`ExecutionError::Cancelled`] when the termination flag is set
/// before every range has been processed.
#[instrument(
    name = "core.core_distances",
    err,
    skip(tree, distances, execution),
    fields(points = distances.len(), samples = samples.get()),
)]
pub fn core_distances<T: Coordinate>(
    tree: &KdTree,
    distances: &Distances<'_, T>,
    samples: NonZeroUsize,
    execution: &Execution,
) -> Result<CoreDistances, ExecutionError> {
    let chunks = execution.run_partitioned(Phase::CoreDistances, distances.len(), |range| {
        Ok::<_, ExecutionError>(
            range
                .map(|point| {
                    tree.k_nearest_unchecked(distances, point, samples.get())
                        .farthest_squared()
                        .unwrap_or(0.0)
                })
                .collect::<Vec<_>>(),
        )
    })?;
    let squared: Vec<f64> = chunks.into_iter().flatten().collect();
    debug!(points = squared.len(), "core distances computed");
    Ok(CoreDistances { squared })
}
