//! Cluster extraction from the mutual-reachability minimum spanning tree.
//!
//! Extraction runs in four sequential steps:
//!
//! - [`ClusterHierarchy`] replays the MST edges in ascending weight order
//!   through a union-find, recording one binary merge per edge. The result
//!   is the single-linkage dendrogram over `2n - 1` nodes.
//! - [`CondensedTree`] walks the dendrogram from the root and keeps only
//!   splits where both sides hold at least `min_cluster_size` points. Points
//!   on a smaller side fall out of the current cluster at the split
//!   distance.
//! - [`stability`] scores every condensed cluster by its excess of mass, and
//!   [`select_clusters`] picks the most persistent non-overlapping ones.
//! - [`label_points`] maps each point to the selected cluster it belongs to,
//!   or to noise.
//!
//! Every walk is an explicit loop over dense ids, so deep, unbalanced
//! hierarchies cannot exhaust the stack.

mod condense;
mod dendrogram;
mod labels;
mod stability;
mod union_find;

use std::fmt;

use crate::execution::ExecutionError;

pub use self::{
    condense::CondensedTree,
    dendrogram::ClusterHierarchy,
    labels::label_points,
    stability::{select_clusters, stability},
};

/// Errors returned while building the cluster hierarchy.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum HierarchyError {
    /// Hierarchy construction requires at least one point.
    #[error("cannot build a hierarchy for an empty dataset")]
    EmptyDataset,
    /// A spanning tree over `n` points must have `n - 1` edges.
    #[error("expected {expected} edges, found {actual}")]
    EdgeCountMismatch {
        /// Edges required to span every point.
        expected: usize,
        /// Edges supplied.
        actual: usize,
    },
    /// An edge referenced a point that does not exist.
    #[error("edge references point {node}, but node_count is {node_count}")]
    InvalidNodeId {
        /// The invalid point id.
        node: usize,
        /// The number of points.
        node_count: usize,
    },
    /// An edge weight was negative or non-finite.
    #[error("invalid edge weight {weight} for edge ({left}, {right})")]
    InvalidEdgeWeight {
        /// Smaller endpoint of the offending edge.
        left: usize,
        /// Larger endpoint of the offending edge.
        right: usize,
        /// The rejected weight.
        weight: f64,
    },
    /// Edges were not in ascending weight order.
    #[error("edge {index} is lighter than its predecessor")]
    UnsortedEdges {
        /// Position of the first out-of-order edge.
        index: usize,
    },
    /// An edge joined two points that were already connected.
    #[error("edge ({left}, {right}) closes a cycle")]
    Cycle {
        /// Smaller endpoint of the offending edge.
        left: usize,
        /// Larger endpoint of the offending edge.
        right: usize,
    },
    /// The run was cancelled between merges.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl HierarchyError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> HierarchyErrorCode {
        match self {
            Self::EmptyDataset => HierarchyErrorCode::EmptyDataset,
            Self::EdgeCountMismatch { .. } => HierarchyErrorCode::EdgeCountMismatch,
            Self::InvalidNodeId { .. } => HierarchyErrorCode::InvalidNodeId,
            Self::InvalidEdgeWeight { .. } => HierarchyErrorCode::InvalidEdgeWeight,
            Self::UnsortedEdges { .. } => HierarchyErrorCode::UnsortedEdges,
            Self::Cycle { .. } => HierarchyErrorCode::Cycle,
            Self::Execution(_) => HierarchyErrorCode::Execution,
        }
    }
}

/// Machine-readable error codes for [`HierarchyError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum HierarchyErrorCode {
    /// The caller supplied an empty dataset.
    EmptyDataset,
    /// The edge count does not span the points.
    EdgeCountMismatch,
    /// An edge referenced an unknown point.
    InvalidNodeId,
    /// An edge weight was invalid.
    InvalidEdgeWeight,
    /// Edges were not sorted by weight.
    UnsortedEdges,
    /// An edge closed a cycle.
    Cycle,
    /// The run was cancelled.
    Execution,
}

impl HierarchyErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyDataset => "HIERARCHY_EMPTY_DATASET",
            Self::EdgeCountMismatch => "HIERARCHY_EDGE_COUNT_MISMATCH",
            Self::InvalidNodeId => "HIERARCHY_INVALID_NODE_ID",
            Self::InvalidEdgeWeight => "HIERARCHY_INVALID_EDGE_WEIGHT",
            Self::UnsortedEdges => "HIERARCHY_UNSORTED_EDGES",
            Self::Cycle => "HIERARCHY_CYCLE",
            Self::Execution => "HIERARCHY_EXECUTION",
        }
    }
}

impl fmt::Display for HierarchyErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts a merge distance to its density level `1 / distance`.
///
/// A zero distance maps to `f64::MAX` rather than infinity so that lambda
/// differences stay finite.
#[must_use]
pub fn lambda_of(distance: f64) -> f64 {
    (1.0 / distance).min(f64::MAX)
}
