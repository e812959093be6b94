//! Oracle equivalence and structural invariants of the Boruvka tree.

use std::num::NonZeroUsize;

use proptest::{prop_assert, prop_assert_eq, test_runner::TestCaseResult};

use crate::{
    core_distance::core_distances,
    kdtree::KdTreeBuilder,
    mst::{BoruvkaTraversal, MinimumSpanningTree, boruvka_mst},
    test_utils::{distances_for, execution_with},
};

use super::{
    oracle::{brute_core_distances, prim},
    types::MstFixture,
};

/// Relative tolerance for comparing totals summed in different orders.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Runs the full core-distance and MST pipeline for `fixture`.
pub(super) fn build_spanning_tree(
    fixture: &MstFixture,
    traversal: BoruvkaTraversal,
    threads: usize,
) -> MinimumSpanningTree {
    let execution = execution_with(threads);
    let distances = distances_for(&fixture.points, &execution);
    let tree = KdTreeBuilder::new(&distances, &execution)
        .leaf_size(fixture.leaf_size)
        .build()
        .expect("fixture tree must build");
    let samples = NonZeroUsize::new(fixture.samples).expect("fixture samples are positive");
    let core = core_distances(&tree, &distances, samples, &execution)
        .expect("core distances must compute");
    boruvka_mst(&tree, &distances, &core, traversal, &execution).expect("MST must build")
}

/// Both traversals match the oracle's total weight and agree edge for edge.
pub(super) fn run_oracle_equivalence_property(fixture: &MstFixture) -> TestCaseResult {
    let oracle = prim(&fixture.points, fixture.samples);
    let single = build_spanning_tree(fixture, BoruvkaTraversal::SingleTree, 2);
    let dual = build_spanning_tree(fixture, BoruvkaTraversal::DualTree, 2);

    prop_assert_eq!(single.len(), oracle.edge_count);
    let scale = oracle.total_weight.abs().max(1.0);
    prop_assert!(
        (single.total_weight() - oracle.total_weight).abs() <= WEIGHT_TOLERANCE * scale,
        "single-tree total {} differs from oracle {} ({:?})",
        single.total_weight(),
        oracle.total_weight,
        fixture.layout,
    );
    prop_assert_eq!(single.edges(), dual.edges());
    Ok(())
}

/// The tree is canonical, acyclic, spanning and never lighter than the
/// endpoint core distances.
pub(super) fn run_structural_invariants_property(fixture: &MstFixture) -> TestCaseResult {
    let count = fixture.points.rows().len();
    let spanning_tree = build_spanning_tree(fixture, BoruvkaTraversal::SingleTree, 1);
    let core = brute_core_distances(&fixture.points, fixture.samples);

    prop_assert_eq!(spanning_tree.node_count(), count);
    prop_assert_eq!(spanning_tree.len(), count.saturating_sub(1));

    let mut parent: Vec<usize> = (0..count).collect();
    for (position, edge) in spanning_tree.edges().iter().enumerate() {
        prop_assert!(edge.source() < edge.target());
        prop_assert!(edge.target() < count);
        prop_assert_eq!(edge.sequence(), position as u64);
        prop_assert!(edge.weight().is_finite());
        prop_assert!(edge.weight() >= core[edge.source()].max(core[edge.target()]));

        let left = find_root(&mut parent, edge.source());
        let right = find_root(&mut parent, edge.target());
        prop_assert!(left != right, "edge {:?} closes a cycle", edge);
        parent[right] = left;
    }
    Ok(())
}

fn find_root(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}
