//! Point labelling from selected clusters.

use crate::result::{Labels, NOISE};

use super::CondensedTree;

/// Assigns every point to the selected cluster it belongs to, or to noise.
///
/// Clusters are visited in ascending id order so that parents resolve first.
/// A cluster inherits its parent's label when the parent is labelled, takes
/// its own id when selected and is noise otherwise. Points then take the
/// label of the cluster they detached from. Cluster ids are renumbered from
/// zero in the order their first point appears.
#[must_use]
pub fn label_points(tree: &CondensedTree, selected: &[bool]) -> Labels {
    let root = tree.root();
    let mut cluster_label: Vec<Option<usize>> = vec![None; tree.cluster_count()];
    for offset in 1..tree.cluster_count() {
        let parent = tree.parent(root + offset) - root;
        cluster_label[offset] = cluster_label[parent].or_else(|| {
            selected
                .get(offset)
                .copied()
                .unwrap_or(false)
                .then_some(offset)
        });
    }

    let mut renumbered: Vec<Option<i64>> = vec![None; tree.cluster_count()];
    let mut next = 0_i64;
    let labels = (0..tree.point_count())
        .map(|point| {
            let Some(cluster) = cluster_label[tree.parent(point) - root] else {
                return NOISE;
            };
            *renumbered[cluster].get_or_insert_with(|| {
                let label = next;
                next += 1;
                label
            })
        })
        .collect();

    Labels::from_contiguous(labels)
}
