//! Point-cloud generators for MST property tests.

use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::test_utils::{VecSource, lattice_points, uniform_points};

use super::types::{MstFixture, PointLayout};

const MIN_POINTS: usize = 1;
const MAX_POINTS: usize = 96;

/// Generates fixtures across every [`PointLayout`].
pub(super) fn mst_fixture_strategy() -> impl Strategy<Value = MstFixture> {
    (any::<PointLayout>(), any::<u64>()).prop_map(|(layout, seed)| {
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_fixture(layout, &mut rng)
    })
}

/// Generates a fixture for an explicit layout.
pub(super) fn generate_fixture(layout: PointLayout, rng: &mut SmallRng) -> MstFixture {
    let count = rng.gen_range(MIN_POINTS..=MAX_POINTS);
    let dimension = rng.gen_range(1..=4);
    let seed = rng.r#gen::<u64>();
    let points = match layout {
        PointLayout::Uniform => uniform_points(seed, count, dimension, 25.0),
        PointLayout::Lattice => lattice_points(seed, count, dimension, 5),
        PointLayout::Duplicates => duplicates(rng, count, dimension),
        PointLayout::Collinear => collinear(rng, count, dimension),
    };
    MstFixture {
        points,
        samples: rng.gen_range(1..=6),
        leaf_size: rng.gen_range(1..=8),
        layout,
    }
}

fn duplicates(rng: &mut SmallRng, count: usize, dimension: usize) -> VecSource<f64> {
    let distinct: Vec<Vec<f64>> = (0..rng.gen_range(1..=4))
        .map(|_| (0..dimension).map(|_| rng.gen_range(-3.0..3.0)).collect())
        .collect();
    let rows = (0..count)
        .map(|_| distinct[rng.gen_range(0..distinct.len())].clone())
        .collect();
    VecSource::with_dimension("duplicates", dimension, rows)
}

fn collinear(rng: &mut SmallRng, count: usize, dimension: usize) -> VecSource<f64> {
    let rows = (0..count)
        .map(|_| {
            let mut row = vec![0.0; dimension];
            row[0] = rng.gen_range(-50.0..50.0);
            row
        })
        .collect();
    VecSource::with_dimension("collinear", dimension, rows)
}
