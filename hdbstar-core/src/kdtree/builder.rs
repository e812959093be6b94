//! Recursive median-split construction of the KD-tree arena.

use std::cmp::Ordering;

use tracing::{debug, instrument};

use crate::{
    Coordinate, Distances, Execution,
    execution::Phase,
};

use super::{Aabb, KdNode, KdNodeKind, KdTree, KdTreeError, SplitInformation};

/// Default maximum number of points per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 1;

/// Configures and builds a [`KdTree`].
///
/// Each node splits its range at the middle position along the dimension of
/// widest spread. The two halves therefore differ in size by at most one and
/// are never empty, even when every coordinate on that dimension is equal.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use hdbstar_core::{
///     Distances, Execution, KdTreeBuilder, SilentProgress, TerminationFlag, VectorSource,
///     VectorSourceError,
/// };
///
/// struct Line(Vec<[f32; 1]>);
///
/// impl VectorSource for Line {
///     type Coordinate = f32;
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn dimension(&self) -> usize { 1 }
///     fn vector(&self, index: usize) -> Result<&[f32], VectorSourceError> {
///         self.0.get(index).map(|row| row.as_slice()).ok_or(VectorSourceError::OutOfBounds { index })
///     }
/// }
///
/// let execution = Execution::new(1, TerminationFlag::running(), Arc::new(SilentProgress))?;
/// let source = Line(vec![[3.0], [1.0], [2.0], [0.0]]);
/// let distances = Distances::new(&source, &execution)?;
/// let tree = KdTreeBuilder::new(&distances, &execution).leaf_size(2).build()?;
/// assert_eq!(tree.point_count(), 4);
/// assert_eq!(tree.node_count(), 3);
/// assert!(tree.nodes().iter().filter(|node| node.is_leaf()).all(|leaf| leaf.len() <= 2));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct KdTreeBuilder<'d, 'a, T> {
    distances: &'d Distances<'a, T>,
    execution: &'d Execution,
    leaf_size: usize,
}

impl<'d, 'a, T: Coordinate> KdTreeBuilder<'d, 'a, T> {
    /// Creates a builder using [`DEFAULT_LEAF_SIZE`].
    #[must_use]
    pub fn new(distances: &'d Distances<'a, T>, execution: &'d Execution) -> Self {
        Self {
            distances,
            execution,
            leaf_size: DEFAULT_LEAF_SIZE,
        }
    }

    /// Overrides the maximum number of points per leaf.
    #[must_use]
    pub fn leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Builds the tree.
    ///
    /// The range split and id assignment run on the calling thread; bounding
    /// boxes of large ranges are computed on the worker pool. The
    /// termination flag is polled before every node.
    ///
    /// # Errors
    /// Returns [`KdTreeError::Empty`] for an empty point set,
    /// [`KdTreeError::InvalidLeafSize`] for a zero leaf size, and
    /// [`KdTreeError::Execution`] when the build is cancelled.
    #[instrument(
        name = "core.kdtree",
        err,
        skip(self),
        fields(points = self.distances.len(), leaf_size = self.leaf_size),
    )]
    pub fn build(self) -> Result<KdTree, KdTreeError> {
        if self.distances.is_empty() {
            return Err(KdTreeError::Empty);
        }
        if self.leaf_size == 0 {
            return Err(KdTreeError::InvalidLeafSize);
        }

        let mut ids: Vec<usize> = (0..self.distances.len()).collect();
        let mut nodes = Vec::with_capacity(node_capacity(ids.len(), self.leaf_size));
        self.build_range(&mut ids, 0, &mut nodes)?;

        debug!(nodes = nodes.len(), "kd-tree built");
        Ok(KdTree {
            nodes,
            ids,
            leaf_size: self.leaf_size,
            dimension: self.distances.dimension(),
        })
    }

    /// Builds the subtree for `ids`, which starts at absolute position
    /// `offset`, and returns the arena id of its root.
    fn build_range(
        &self,
        ids: &mut [usize],
        offset: usize,
        nodes: &mut Vec<KdNode>,
    ) -> Result<usize, KdTreeError> {
        self.execution.check(Phase::KdTree)?;

        let aabb = Aabb::covering_parallel(self.distances, ids, self.execution);
        let start = offset;
        let end = offset + ids.len();

        if ids.len() <= self.leaf_size {
            self.execution.report(Phase::KdTree, ids.len());
            return Ok(push_node(nodes, start, end, aabb, KdNodeKind::Leaf));
        }

        let dimension = aabb.widest_dimension();
        let middle = ids.len() / 2;
        let distances = self.distances;
        ids.select_nth_unstable_by(middle, |&a, &b| {
            compare_on(distances, dimension, a, b)
        });
        let value = distances.coordinate(ids[middle], dimension);

        let (left_ids, right_ids) = ids.split_at_mut(middle);
        let left = self.build_range(left_ids, offset, nodes)?;
        let right = self.build_range(right_ids, offset + middle, nodes)?;

        let kind = KdNodeKind::Internal {
            split: SplitInformation { dimension, value },
            left,
            right,
        };
        Ok(push_node(nodes, start, end, aabb, kind))
    }
}

fn compare_on<T: Coordinate>(
    distances: &Distances<'_, T>,
    dimension: usize,
    left: usize,
    right: usize,
) -> Ordering {
    distances
        .coordinate(left, dimension)
        .total_cmp(&distances.coordinate(right, dimension))
        .then_with(|| left.cmp(&right))
}

fn push_node(
    nodes: &mut Vec<KdNode>,
    start: usize,
    end: usize,
    aabb: Aabb,
    kind: KdNodeKind,
) -> usize {
    let id = nodes.len();
    nodes.push(KdNode {
        id,
        start,
        end,
        aabb,
        kind,
    });
    id
}

fn node_capacity(points: usize, leaf_size: usize) -> usize {
    let leaves = points.div_ceil(leaf_size).max(1);
    leaves.saturating_mul(2)
}
