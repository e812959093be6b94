//! Condensation of the single-linkage dendrogram.

use std::{collections::VecDeque, convert::Infallible, num::NonZeroUsize};

use tracing::{debug, instrument};

use crate::execution::{ExecutionError, Phase, TerminationFlag};

use super::{ClusterHierarchy, lambda_of};

/// Dendrogram pruned to splits where both sides reach the minimum cluster
/// size.
///
/// Ids `0..n` are points and `n` is the root cluster; surviving clusters are
/// numbered `n + 1 ..= maximum_cluster_id` in creation order, so a cluster's
/// parent always has a smaller id. Every non-root node records the cluster
/// it detached from and the distance at which it did so.
#[derive(Clone, Debug, PartialEq)]
pub struct CondensedTree {
    point_count: usize,
    min_cluster_size: NonZeroUsize,
    parent: Vec<usize>,
    distance: Vec<f64>,
    size: Vec<usize>,
}

impl CondensedTree {
    /// Condenses `hierarchy`, collapsing every merge where a side holds
    /// fewer than `min_cluster_size` points.
    #[must_use]
    pub fn condense(hierarchy: &ClusterHierarchy, min_cluster_size: NonZeroUsize) -> Self {
        let Ok(tree) = Self::condense_checked(hierarchy, min_cluster_size, || {
            Ok::<(), Infallible>(())
        });
        tree
    }

    /// Like [`Self::condense`], polling `termination` before every merge.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Cancelled`] once `termination` is cancelled.
    pub fn condense_with(
        hierarchy: &ClusterHierarchy,
        min_cluster_size: NonZeroUsize,
        termination: &TerminationFlag,
    ) -> Result<Self, ExecutionError> {
        Self::condense_checked(hierarchy, min_cluster_size, || {
            termination.check(Phase::Condense)
        })
    }

    #[instrument(
        name = "core.condense",
        skip(hierarchy, min_cluster_size, check),
        fields(points = hierarchy.point_count(), min_cluster_size = min_cluster_size.get()),
    )]
    fn condense_checked<E>(
        hierarchy: &ClusterHierarchy,
        min_cluster_size: NonZeroUsize,
        mut check: impl FnMut() -> Result<(), E>,
    ) -> Result<Self, E> {
        let point_count = hierarchy.point_count();
        let root = point_count;
        let mut tree = Self {
            point_count,
            min_cluster_size,
            parent: vec![root; point_count + 1],
            distance: vec![f64::INFINITY; point_count + 1],
            size: vec![1; point_count + 1],
        };
        tree.size[root] = point_count;

        let node_count = hierarchy.node_count();
        let mut relabel = vec![root; node_count];
        let mut visited = vec![false; node_count];
        let threshold = min_cluster_size.get();

        for node in (point_count..node_count).rev() {
            check()?;
            if visited[node] {
                continue;
            }
            let Some((left, right)) = hierarchy.children(node) else {
                continue;
            };
            let current = relabel[node];
            let distance = hierarchy.distance(node);
            let left_size = hierarchy.size(left);
            let right_size = hierarchy.size(right);

            match (left_size >= threshold, right_size >= threshold) {
                (true, true) => {
                    for (child, size) in [(left, left_size), (right, right_size)] {
                        let cluster = tree.push_cluster(current, distance, size);
                        relabel[child] = cluster;
                        if hierarchy.is_point(child) {
                            tree.detach_point(child, cluster, distance);
                        }
                    }
                }
                (true, false) => {
                    relabel[left] = current;
                    tree.fall_out(hierarchy, right, current, distance, &mut visited);
                }
                (false, true) => {
                    relabel[right] = current;
                    tree.fall_out(hierarchy, left, current, distance, &mut visited);
                }
                (false, false) => {
                    tree.fall_out(hierarchy, left, current, distance, &mut visited);
                    tree.fall_out(hierarchy, right, current, distance, &mut visited);
                }
            }
        }

        debug!(clusters = tree.cluster_count(), "condensed tree built");
        Ok(tree)
    }

    /// Returns the number of points.
    #[must_use]
    #[rustfmt::skip]
    pub fn point_count(&self) -> usize { self.point_count }

    /// Returns the minimum cluster size used for condensation.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_cluster_size(&self) -> NonZeroUsize { self.min_cluster_size }

    /// Returns the id of the root cluster.
    #[must_use]
    #[rustfmt::skip]
    pub fn root(&self) -> usize { self.point_count }

    /// Returns the highest cluster id allocated.
    #[must_use]
    #[rustfmt::skip]
    pub fn maximum_cluster_id(&self) -> usize { self.parent.len() - 1 }

    /// Returns the number of clusters, including the root.
    #[must_use]
    #[rustfmt::skip]
    pub fn cluster_count(&self) -> usize { self.parent.len() - self.point_count }

    /// Returns the cluster `node` detached from; the root is its own parent.
    #[must_use]
    #[rustfmt::skip]
    pub fn parent(&self, node: usize) -> usize { self.parent[node] }

    /// Returns the distance at which `node` detached from its parent.
    ///
    /// The root reports infinity.
    #[must_use]
    #[rustfmt::skip]
    pub fn distance(&self, node: usize) -> f64 { self.distance[node] }

    /// Returns the density level at which `node` detached from its parent.
    #[must_use]
    pub fn lambda(&self, node: usize) -> f64 {
        lambda_of(self.distance[node])
    }

    /// Returns the number of points beneath `node`; points have size one.
    #[must_use]
    #[rustfmt::skip]
    pub fn size(&self, node: usize) -> usize { self.size[node] }

    /// Returns `true` when `node` is a point.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_point(&self, node: usize) -> bool { node < self.point_count }

    /// Iterates over the direct children of `cluster`, points and clusters
    /// alike, in ascending id order.
    pub fn children_of(&self, cluster: usize) -> impl Iterator<Item = usize> + '_ {
        let root = self.root();
        self.parent
            .iter()
            .enumerate()
            .filter(move |&(node, &parent)| parent == cluster && node != root)
            .map(|(node, _)| node)
    }

    fn push_cluster(&mut self, parent: usize, distance: f64, size: usize) -> usize {
        self.parent.push(parent);
        self.distance.push(distance);
        self.size.push(size);
        self.parent.len() - 1
    }

    fn detach_point(&mut self, point: usize, cluster: usize, distance: f64) {
        self.parent[point] = cluster;
        self.distance[point] = distance;
    }

    /// Detaches every point beneath `node` from `cluster` at `distance`.
    fn fall_out(
        &mut self,
        hierarchy: &ClusterHierarchy,
        node: usize,
        cluster: usize,
        distance: f64,
        visited: &mut [bool],
    ) {
        let mut queue = VecDeque::from([node]);
        while let Some(next) = queue.pop_front() {
            match hierarchy.children(next) {
                Some((left, right)) => {
                    visited[next] = true;
                    queue.push_back(left);
                    queue.push_back(right);
                }
                None => self.detach_point(next, cluster, distance),
            }
        }
    }
}
