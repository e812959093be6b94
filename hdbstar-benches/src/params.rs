//! Benchmark parameter types.
//!
//! Each type renders as the Criterion parameter label of one benchmark case.

use std::fmt;

use hdbstar_core::BoruvkaTraversal;

/// Parameters for a KD-tree or core-distance benchmark run.
#[derive(Clone, Debug)]
pub struct PipelineBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
}

impl fmt::Display for PipelineBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={}", self.point_count)
    }
}

/// Parameters for a Boruvka spanning tree benchmark run.
#[derive(Clone, Debug)]
pub struct MstBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
    /// Search strategy under test.
    pub traversal: BoruvkaTraversal,
}

impl fmt::Display for MstBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},{}", self.point_count, self.traversal)
    }
}

/// Parameters for a hierarchy extraction benchmark run.
#[derive(Clone, Debug)]
pub struct ExtractionBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
    /// Minimum cluster size for condensation.
    pub min_cluster_size: usize,
}

impl fmt::Display for ExtractionBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},min={}", self.point_count, self.min_cluster_size)
    }
}
