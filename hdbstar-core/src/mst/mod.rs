//! Mutual-reachability minimum spanning tree by Boruvka rounds.
//!
//! Each round finds, for every component, its closest edge to another
//! component by searching the KD-tree, then merges the components joined by
//! those edges. Edges are weighted by the mutual-reachability distance
//! `max(core(p), core(q), d(p, q))`. Two search strategies are available:
//! a single-tree search that probes the tree once per point, and a dual-tree
//! search that walks pairs of subtrees. Both share the base case, the
//! per-component tracker and the merge step, and produce identical edges.

mod boruvka;
mod dual_tree;
mod single_tree;
mod tracker;
mod union_find;

use std::{cmp::Ordering, fmt};

use crate::execution::ExecutionError;

pub use self::boruvka::boruvka_mst;

/// Errors returned while computing the mutual-reachability spanning tree.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MstError {
    /// The core-distance table does not cover every point.
    #[error("expected {expected} core distances, found {actual}")]
    InvalidCoreDistances {
        /// Number of indexed points.
        expected: usize,
        /// Number of core distances supplied.
        actual: usize,
    },
    /// The KD-tree and the distance provider disagree on the point count.
    #[error("KD-tree indexes {actual} points but the distance provider holds {expected}")]
    PointCountMismatch {
        /// Points held by the distance provider.
        expected: usize,
        /// Points indexed by the tree.
        actual: usize,
    },
    /// A round finished without merging any component.
    #[error("Boruvka round merged nothing with {components} components left")]
    NoProgress {
        /// Components remaining when the round stalled.
        components: usize,
    },
    /// The search was cancelled or the worker pool failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl MstError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> MstErrorCode {
        match self {
            Self::InvalidCoreDistances { .. } => MstErrorCode::InvalidCoreDistances,
            Self::PointCountMismatch { .. } => MstErrorCode::PointCountMismatch,
            Self::NoProgress { .. } => MstErrorCode::NoProgress,
            Self::Execution(_) => MstErrorCode::Execution,
        }
    }
}

/// Machine-readable error codes for [`MstError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum MstErrorCode {
    /// The core-distance table does not cover every point.
    InvalidCoreDistances,
    /// The KD-tree and the distance provider disagree on the point count.
    PointCountMismatch,
    /// A round finished without merging any component.
    NoProgress,
    /// The search was cancelled or the worker pool failed.
    Execution,
}

impl MstErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCoreDistances => "MST_INVALID_CORE_DISTANCES",
            Self::PointCountMismatch => "MST_POINT_COUNT_MISMATCH",
            Self::NoProgress => "MST_NO_PROGRESS",
            Self::Execution => "MST_EXECUTION",
        }
    }
}

impl fmt::Display for MstErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search strategy used by each Boruvka round.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum BoruvkaTraversal {
    /// Probe the tree once per point.
    #[default]
    SingleTree,
    /// Walk pairs of query and reference subtrees.
    DualTree,
}

impl BoruvkaTraversal {
    /// Returns the stable identifier used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleTree => "single-tree",
            Self::DualTree => "dual-tree",
        }
    }
}

impl fmt::Display for BoruvkaTraversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spanning-tree edge in canonical undirected form (`source < target`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MstEdge {
    source: usize,
    target: usize,
    weight: f64,
    sequence: u64,
}

impl MstEdge {
    /// Creates an edge, ordering the endpoints canonically.
    #[must_use]
    pub fn new(left: usize, right: usize, weight: f64, sequence: u64) -> Self {
        Self {
            source: left.min(right),
            target: left.max(right),
            weight,
            sequence,
        }
    }

    /// Returns the smaller endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> usize { self.source }

    /// Returns the larger endpoint id.
    #[must_use]
    #[rustfmt::skip]
    pub fn target(&self) -> usize { self.target }

    /// Returns the mutual-reachability distance between the endpoints.
    #[must_use]
    #[rustfmt::skip]
    pub fn weight(&self) -> f64 { self.weight }

    /// Returns the position at which the edge was merged.
    #[must_use]
    #[rustfmt::skip]
    pub fn sequence(&self) -> u64 { self.sequence }
}

impl Eq for MstEdge {}

impl Ord for MstEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.source.cmp(&other.source))
            .then_with(|| self.target.cmp(&other.target))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for MstEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The spanning tree produced by [`boruvka_mst`], edges in merge order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MinimumSpanningTree {
    edges: Vec<MstEdge>,
    total_weight: f64,
    node_count: usize,
}

impl MinimumSpanningTree {
    pub(crate) fn new(node_count: usize, edges: Vec<MstEdge>) -> Self {
        let total_weight = edges.iter().map(MstEdge::weight).sum();
        Self {
            edges,
            total_weight,
            node_count,
        }
    }

    /// Returns the edges in the order they were merged.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[MstEdge] { &self.edges }

    /// Returns the sum of all edge weights.
    #[must_use]
    #[rustfmt::skip]
    pub fn total_weight(&self) -> f64 { self.total_weight }

    /// Returns the number of edges.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.edges.len() }

    /// Returns `true` for the edgeless tree over a single point.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.edges.is_empty() }

    /// Returns the number of points spanned.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.node_count }

    /// Returns the edges sorted by ascending weight, ties kept in merge order.
    #[must_use]
    pub fn sorted_edges(&self) -> Vec<MstEdge> {
        let mut edges = self.edges.clone();
        edges.sort_by(|left, right| left.weight.total_cmp(&right.weight));
        edges
    }
}

#[cfg(test)]
mod property;
