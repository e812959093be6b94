//! Single-linkage dendrogram built from sorted spanning-tree edges.

use tracing::{debug, instrument};

use crate::{
    execution::{Phase, TerminationFlag},
    mst::{MinimumSpanningTree, MstEdge},
};

use super::{HierarchyError, lambda_of, union_find::LabelUnionFind};

/// Binary merge hierarchy over `2n - 1` nodes.
///
/// Nodes `0..n` are points. Node `n + k` is the `k`-th merge in ascending
/// distance order, so every internal node has a larger id than both of its
/// children and the root is `2n - 2`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterHierarchy {
    point_count: usize,
    left: Vec<usize>,
    right: Vec<usize>,
    distance: Vec<f64>,
    size: Vec<usize>,
}

impl ClusterHierarchy {
    /// Builds the hierarchy from a spanning tree, replaying its edges in
    /// ascending weight order.
    ///
    /// # Errors
    /// Returns [`HierarchyError`] when the tree is empty or its edges do not
    /// form a spanning tree over `node_count` points.
    pub fn from_spanning_tree(tree: &MinimumSpanningTree) -> Result<Self, HierarchyError> {
        Self::from_spanning_tree_with(tree, &TerminationFlag::running())
    }

    /// Like [`Self::from_spanning_tree`], polling `termination` before
    /// every merge.
    ///
    /// # Errors
    /// As [`Self::from_sorted_edges_with`].
    pub fn from_spanning_tree_with(
        tree: &MinimumSpanningTree,
        termination: &TerminationFlag,
    ) -> Result<Self, HierarchyError> {
        Self::from_sorted_edges_with(tree.node_count(), &tree.sorted_edges(), termination)
    }

    /// Builds the hierarchy from edges already sorted by weight.
    ///
    /// Each edge merges the components of its endpoints into a new node at
    /// the edge weight.
    ///
    /// # Errors
    /// Returns [`HierarchyError::EmptyDataset`] for zero points,
    /// [`HierarchyError::EdgeCountMismatch`] unless there are `n - 1` edges,
    /// [`HierarchyError::InvalidNodeId`] for out-of-range endpoints,
    /// [`HierarchyError::InvalidEdgeWeight`] for negative or non-finite
    /// weights, [`HierarchyError::UnsortedEdges`] when weights decrease and
    /// [`HierarchyError::Cycle`] when an edge joins connected points.
    pub fn from_sorted_edges(point_count: usize, edges: &[MstEdge]) -> Result<Self, HierarchyError> {
        Self::from_sorted_edges_with(point_count, edges, &TerminationFlag::running())
    }

    /// Like [`Self::from_sorted_edges`], polling `termination` before every
    /// merge.
    ///
    /// # Errors
    /// The errors of [`Self::from_sorted_edges`], plus
    /// [`HierarchyError::Execution`] once `termination` is cancelled.
    #[instrument(
        name = "core.hierarchy",
        err,
        skip(edges, termination),
        fields(edges = edges.len()),
    )]
    pub fn from_sorted_edges_with(
        point_count: usize,
        edges: &[MstEdge],
        termination: &TerminationFlag,
    ) -> Result<Self, HierarchyError> {
        if point_count == 0 {
            return Err(HierarchyError::EmptyDataset);
        }
        let expected = point_count - 1;
        if edges.len() != expected {
            return Err(HierarchyError::EdgeCountMismatch {
                expected,
                actual: edges.len(),
            });
        }

        let mut left = Vec::with_capacity(expected);
        let mut right = Vec::with_capacity(expected);
        let mut distance = Vec::with_capacity(expected);
        let mut size = Vec::with_capacity(expected);
        let mut union_find = LabelUnionFind::new(point_count);
        let mut previous = 0.0_f64;

        for (index, edge) in edges.iter().enumerate() {
            termination.check(Phase::Hierarchy)?;
            validate_edge(point_count, edge)?;
            if index > 0 && edge.weight() < previous {
                return Err(HierarchyError::UnsortedEdges { index });
            }
            previous = edge.weight();

            let left_root = union_find.find(edge.source());
            let right_root = union_find.find(edge.target());
            if left_root == right_root {
                return Err(HierarchyError::Cycle {
                    left: edge.source(),
                    right: edge.target(),
                });
            }

            let merged_size = node_size(point_count, &size, left_root)
                + node_size(point_count, &size, right_root);
            union_find.union(left_root, right_root);
            left.push(left_root);
            right.push(right_root);
            distance.push(edge.weight());
            size.push(merged_size);
        }

        debug!(point_count, merges = left.len(), "single-linkage hierarchy built");
        Ok(Self {
            point_count,
            left,
            right,
            distance,
            size,
        })
    }

    /// Returns the number of leaves.
    #[must_use]
    #[rustfmt::skip]
    pub fn point_count(&self) -> usize { self.point_count }

    /// Returns the total number of nodes, `2n - 1`.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.point_count + self.left.len() }

    /// Returns the id of the root node.
    #[must_use]
    #[rustfmt::skip]
    pub fn root(&self) -> usize { self.node_count() - 1 }

    /// Returns the left child of an internal node.
    #[must_use]
    pub fn left(&self, node: usize) -> Option<usize> {
        self.merge_index(node).map(|index| self.left[index])
    }

    /// Returns the right child of an internal node.
    #[must_use]
    pub fn right(&self, node: usize) -> Option<usize> {
        self.merge_index(node).map(|index| self.right[index])
    }

    /// Returns both children of an internal node.
    #[must_use]
    pub fn children(&self, node: usize) -> Option<(usize, usize)> {
        self.merge_index(node)
            .map(|index| (self.left[index], self.right[index]))
    }

    /// Returns the merge distance of a node; points sit at distance zero.
    #[must_use]
    pub fn distance(&self, node: usize) -> f64 {
        self.merge_index(node)
            .map_or(0.0, |index| self.distance[index])
    }

    /// Returns the density level at which a node forms.
    #[must_use]
    pub fn lambda(&self, node: usize) -> f64 {
        lambda_of(self.distance(node))
    }

    /// Returns the number of points beneath a node.
    #[must_use]
    pub fn size(&self, node: usize) -> usize {
        self.merge_index(node).map_or(1, |index| self.size[index])
    }

    /// Returns `true` when `node` is a point.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_point(&self, node: usize) -> bool { node < self.point_count }

    fn merge_index(&self, node: usize) -> Option<usize> {
        node.checked_sub(self.point_count)
            .filter(|index| *index < self.left.len())
    }
}

fn validate_edge(point_count: usize, edge: &MstEdge) -> Result<(), HierarchyError> {
    for node in [edge.source(), edge.target()] {
        if node >= point_count {
            return Err(HierarchyError::InvalidNodeId {
                node,
                node_count: point_count,
            });
        }
    }
    let weight = edge.weight();
    if !weight.is_finite() || weight < 0.0 {
        return Err(HierarchyError::InvalidEdgeWeight {
            left: edge.source(),
            right: edge.target(),
            weight,
        });
    }
    Ok(())
}

fn node_size(point_count: usize, sizes: &[usize], node: usize) -> usize {
    node.checked_sub(point_count)
        .map_or(1, |index| sizes[index])
}
