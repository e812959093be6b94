//! Excess-of-mass stability scoring and cluster selection.

use super::CondensedTree;

/// Scores every cluster of `tree` by its excess of mass.
///
/// The returned vector is indexed by `cluster - tree.root()`. Each non-root
/// node adds `size * (lambda(node) - lambda(parent))` to its parent, where a
/// cluster's own lambda is the level at which it detached from its parent
/// and the root sits at lambda zero.
#[must_use]
pub fn stability(tree: &CondensedTree) -> Vec<f64> {
    let root = tree.root();
    let mut scores = vec![0.0; tree.cluster_count()];
    for node in (0..=tree.maximum_cluster_id()).filter(|&node| node != root) {
        let parent = tree.parent(node);
        let gain = point_mass(tree.size(node)) * (tree.lambda(node) - tree.lambda(parent));
        scores[parent - root] += gain;
    }
    scores
}

/// Converts a point count to `f64`, exactly for every count below `2^53`.
pub(super) fn point_mass(size: usize) -> f64 {
    let wide = u64::try_from(size).unwrap_or(u64::MAX);
    let high = u32::try_from(wide >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(wide & u64::from(u32::MAX)).unwrap_or(u32::MAX);
    f64::from(high).mul_add(4_294_967_296.0, f64::from(low))
}

/// Selects the clusters that maximise total stability without overlapping.
///
/// Clusters are visited from the highest id down. A cluster is selected when
/// its own stability is at least the summed stability of the selections
/// beneath it; otherwise that sum is carried to its parent. The root is
/// never selected. The returned flags are indexed like [`stability`].
#[must_use]
pub fn select_clusters(tree: &CondensedTree, stability: &[f64]) -> Vec<bool> {
    let root = tree.root();
    let count = tree.cluster_count();
    let mut selected = vec![false; count];
    let mut beneath = vec![0.0; count];

    for offset in (1..count).rev() {
        let own = stability[offset];
        let carried = if beneath[offset] > own {
            beneath[offset]
        } else {
            selected[offset] = true;
            own
        };
        let parent = tree.parent(root + offset) - root;
        beneath[parent] += carried;
    }

    selected
}
