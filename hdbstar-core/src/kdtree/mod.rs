//! Balanced KD-tree over a validated point set.
//!
//! The tree is an arena of [`KdNode`]s addressed by dense ids. Children are
//! stored as ids, never as references, and nodes have no parent links: every
//! traversal in the pipeline walks downwards from the root. Ids are assigned
//! in post-order, so a child always has a smaller id than its parent and the
//! root is the last node. Bottom-up bookkeeping is therefore a plain
//! ascending loop over the arena.

mod aabb;
mod builder;
mod knn;

use std::ops::Range;

use thiserror::Error;

use crate::{error::define_error_codes, execution::ExecutionError};

pub use self::{
    aabb::Aabb,
    builder::{DEFAULT_LEAF_SIZE, KdTreeBuilder},
    knn::{Neighbour, Neighbours},
};

/// Errors raised while building or querying a [`KdTree`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum KdTreeError {
    /// The tree must index at least one point.
    #[error("cannot build a KD-tree over zero points")]
    Empty,
    /// Leaves must hold at least one point.
    #[error("leaf size must be at least 1")]
    InvalidLeafSize,
    /// A query vector did not match the dimensionality of the index.
    #[error("query has dimension {actual} but the index was built over dimension {expected}")]
    DimensionMismatch {
        /// Dimensionality of the indexed points.
        expected: usize,
        /// Dimensionality of the query.
        actual: usize,
    },
    /// A query referenced a point outside the index.
    #[error("point {index} is not indexed (point count {point_count})")]
    PointOutOfBounds {
        /// The requested point id.
        index: usize,
        /// Number of indexed points.
        point_count: usize,
    },
    /// The build was cancelled or the worker pool failed.
    #[error(transparent)]
    Execution {
        /// Underlying task-runner failure.
        #[from]
        source: ExecutionError,
    },
}

define_error_codes! {
    /// Stable codes describing [`KdTreeError`] variants.
    enum KdTreeErrorCode for KdTreeError {
        /// The tree must index at least one point.
        Empty => Empty => "KDTREE_EMPTY",
        /// Leaves must hold at least one point.
        InvalidLeafSize => InvalidLeafSize => "KDTREE_INVALID_LEAF_SIZE",
        /// A query vector did not match the index dimensionality.
        DimensionMismatch => DimensionMismatch { .. } => "KDTREE_DIMENSION_MISMATCH",
        /// A query referenced a point outside the index.
        PointOutOfBounds => PointOutOfBounds { .. } => "KDTREE_POINT_OUT_OF_BOUNDS",
        /// The build was cancelled or the worker pool failed.
        Execution => Execution { .. } => "KDTREE_EXECUTION",
    }
}

/// Split recorded on an internal node.
///
/// Every point in the left child has a coordinate `<= value` on
/// `dimension`, and every point in the right child a coordinate `>= value`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitInformation {
    dimension: usize,
    value: f64,
}

impl SplitInformation {
    /// Returns the split dimension.
    #[must_use]
    #[rustfmt::skip]
    pub fn dimension(&self) -> usize { self.dimension }

    /// Returns the coordinate of the first point of the right child.
    #[must_use]
    #[rustfmt::skip]
    pub fn value(&self) -> f64 { self.value }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum KdNodeKind {
    Leaf,
    Internal {
        split: SplitInformation,
        left: usize,
        right: usize,
    },
}

/// A node of the KD-tree arena.
#[derive(Clone, Debug, PartialEq)]
pub struct KdNode {
    id: usize,
    start: usize,
    end: usize,
    aabb: Aabb,
    kind: KdNodeKind,
}

impl KdNode {
    /// Returns the dense arena id of the node.
    #[must_use]
    #[rustfmt::skip]
    pub fn id(&self) -> usize { self.id }

    /// Returns the first position of the node's range in [`KdTree::ids`].
    #[must_use]
    #[rustfmt::skip]
    pub fn start(&self) -> usize { self.start }

    /// Returns one past the last position of the node's range.
    #[must_use]
    #[rustfmt::skip]
    pub fn end(&self) -> usize { self.end }

    /// Returns the half-open range of positions covered by the node.
    #[must_use]
    #[rustfmt::skip]
    pub fn range(&self) -> Range<usize> { self.start..self.end }

    /// Returns the number of points under the node.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.end - self.start }

    /// Returns `true` when the node covers no points. Never true for a built tree.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.start == self.end }

    /// Returns the bounding box of the node's points.
    #[must_use]
    #[rustfmt::skip]
    pub fn aabb(&self) -> &Aabb { &self.aabb }

    /// Returns `true` for leaves.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, KdNodeKind::Leaf)
    }

    /// Returns the split of an internal node.
    #[must_use]
    pub fn split(&self) -> Option<SplitInformation> {
        match self.kind {
            KdNodeKind::Leaf => None,
            KdNodeKind::Internal { split, .. } => Some(split),
        }
    }

    /// Returns the `(left, right)` child ids of an internal node.
    #[must_use]
    pub fn children(&self) -> Option<(usize, usize)> {
        match self.kind {
            KdNodeKind::Leaf => None,
            KdNodeKind::Internal { left, right, .. } => Some((left, right)),
        }
    }
}

/// Read-only KD-tree produced by [`KdTreeBuilder`].
#[derive(Clone, Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    ids: Vec<usize>,
    leaf_size: usize,
    dimension: usize,
}

impl KdTree {
    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &KdNode {
        &self.nodes[self.root_id()]
    }

    /// Returns the id of the root node.
    #[must_use]
    pub fn root_id(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Returns the node with the given arena id.
    ///
    /// # Panics
    /// Panics when `id >= self.node_count()`.
    #[must_use]
    pub fn node(&self, id: usize) -> &KdNode {
        &self.nodes[id]
    }

    /// Returns every node in post-order.
    #[must_use]
    #[rustfmt::skip]
    pub fn nodes(&self) -> &[KdNode] { &self.nodes }

    /// Returns the number of nodes in the arena.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.nodes.len() }

    /// Returns the `(left, right)` children of `node`, if it is internal.
    #[must_use]
    pub fn children(&self, node: &KdNode) -> Option<(&KdNode, &KdNode)> {
        node.children()
            .map(|(left, right)| (&self.nodes[left], &self.nodes[right]))
    }

    /// Returns the point ids stored under `node`, in tree order.
    #[must_use]
    pub fn leaf_points(&self, node: &KdNode) -> &[usize] {
        &self.ids[node.range()]
    }

    /// Returns the permuted point ids in tree order.
    #[must_use]
    #[rustfmt::skip]
    pub fn ids(&self) -> &[usize] { &self.ids }

    /// Returns the number of indexed points.
    #[must_use]
    #[rustfmt::skip]
    pub fn point_count(&self) -> usize { self.ids.len() }

    /// Returns the maximum number of points per leaf.
    #[must_use]
    #[rustfmt::skip]
    pub fn leaf_size(&self) -> usize { self.leaf_size }

    /// Returns the dimensionality of the indexed points.
    #[must_use]
    #[rustfmt::skip]
    pub fn dimension(&self) -> usize { self.dimension }
}
