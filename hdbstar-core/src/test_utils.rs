//! Shared test utilities for `hdbstar-core`.

use hdbstar_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    Coordinate, Distances, Execution, VectorSource, error::VectorSourceError,
    execution::{SilentProgress, TerminationFlag},
};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `HDBSTAR_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// In-memory [`VectorSource`] backed by one `Vec` per row.
#[derive(Clone, Debug)]
pub(crate) struct VecSource<T> {
    name: &'static str,
    dimension: usize,
    rows: Vec<Vec<T>>,
}

impl<T: Coordinate> VecSource<T> {
    /// Creates a source whose dimension is taken from the first row.
    #[must_use]
    pub(crate) fn new(name: &'static str, rows: Vec<Vec<T>>) -> Self {
        let dimension = rows.first().map_or(0, Vec::len);
        Self {
            name,
            dimension,
            rows,
        }
    }

    /// Creates a source reporting an explicit dimension.
    #[must_use]
    pub(crate) fn with_dimension(name: &'static str, dimension: usize, rows: Vec<Vec<T>>) -> Self {
        Self {
            name,
            dimension,
            rows,
        }
    }

    /// Returns the stored rows.
    #[must_use]
    pub(crate) fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }
}

impl<T: Coordinate> VectorSource for VecSource<T> {
    type Coordinate = T;

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn name(&self) -> &str {
        self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, index: usize) -> Result<&[T], VectorSourceError> {
        self.rows
            .get(index)
            .map(Vec::as_slice)
            .ok_or(VectorSourceError::OutOfBounds { index })
    }
}

/// Builds a two-dimensional source from literal points.
#[must_use]
pub(crate) fn planar(points: &[(f64, f64)]) -> VecSource<f64> {
    VecSource::new(
        "planar",
        points.iter().map(|&(x, y)| vec![x, y]).collect(),
    )
}

/// Samples `count` points uniformly from `[-scale, scale)^dimension`.
#[must_use]
pub(crate) fn uniform_points(seed: u64, count: usize, dimension: usize, scale: f64) -> VecSource<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let rows = (0..count)
        .map(|_| {
            (0..dimension)
                .map(|_| rng.gen_range(-scale..scale))
                .collect()
        })
        .collect();
    VecSource::with_dimension("uniform", dimension, rows)
}

/// Samples integer-valued points so duplicates and exact ties are common.
#[must_use]
pub(crate) fn lattice_points(seed: u64, count: usize, dimension: usize, span: i32) -> VecSource<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let rows = (0..count)
        .map(|_| {
            (0..dimension)
                .map(|_| f64::from(rng.gen_range(0..span.max(1))))
                .collect()
        })
        .collect();
    VecSource::with_dimension("lattice", dimension, rows)
}

/// Creates a single-threaded execution context that is never cancelled.
#[must_use]
pub(crate) fn serial_execution() -> Execution {
    execution_with(1)
}

/// Creates an execution context with `threads` workers.
#[must_use]
pub(crate) fn execution_with(threads: usize) -> Execution {
    match Execution::new(threads, TerminationFlag::running(), std::sync::Arc::new(SilentProgress)) {
        Ok(execution) => execution,
        Err(err) => panic!("test execution context must build: {err}"),
    }
}

/// Validates `source` into a [`Distances`] view, panicking on failure.
#[must_use]
pub(crate) fn distances_for<'a, S: VectorSource>(
    source: &'a S,
    execution: &Execution,
) -> Distances<'a, S::Coordinate> {
    match Distances::new(source, execution) {
        Ok(distances) => distances,
        Err(err) => panic!("test source must validate: {err}"),
    }
}

/// Brute-force Euclidean distance between two rows.
#[must_use]
pub(crate) fn brute_distance<T: Coordinate>(left: &[T], right: &[T]) -> f64 {
    left.iter()
        .zip(right)
        .map(|(&l, &r)| {
            let diff = l.to_f64() - r.to_f64();
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}
