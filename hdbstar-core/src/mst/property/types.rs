//! Fixture types for MST property tests.

use test_strategy::Arbitrary;

use crate::test_utils::VecSource;

/// Shape of the generated point cloud.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
pub(super) enum PointLayout {
    /// Points sampled uniformly from a hypercube.
    #[weight(3)]
    Uniform,
    /// Integer coordinates on a small grid, so ties and duplicates abound.
    #[weight(3)]
    Lattice,
    /// A few distinct points, each repeated many times.
    #[weight(2)]
    Duplicates,
    /// Points along one axis, leaving every other dimension at zero spread.
    #[weight(1)]
    Collinear,
}

/// Input for one MST property case.
#[derive(Clone, Debug)]
pub(super) struct MstFixture {
    /// Points to span.
    pub points: VecSource<f64>,
    /// Neighbour count used for core distances.
    pub samples: usize,
    /// Maximum points per KD-tree leaf.
    pub leaf_size: usize,
    /// Layout used during generation.
    pub layout: PointLayout,
}
