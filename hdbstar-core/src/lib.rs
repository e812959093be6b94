//! HDBSCAN* core library.
//!
//! Clusters points in n-dimensional space by building a KD-tree, computing
//! per-point core distances, growing a mutual-reachability minimum spanning
//! tree with Boruvka rounds and extracting the most stable clusters from the
//! resulting hierarchy. [`HdbscanBuilder`] configures a run and
//! [`Hdbscan::run`] executes it; the individual phases are public for
//! callers that need intermediate artefacts.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod core_distance;
mod distance;
mod error;
mod execution;
mod hdbscan;
pub mod hierarchy;
pub mod kdtree;
pub mod mst;
mod result;
mod vectors;

#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::{DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_SAMPLES, HdbscanBuilder},
    core_distance::{CoreDistances, core_distances},
    distance::{Distances, squared_euclidean},
    error::{HdbscanError, HdbscanErrorCode, Result, VectorSourceError, VectorSourceErrorCode},
    execution::{
        Execution, ExecutionError, ExecutionErrorCode, Phase, ProgressSink, SilentProgress,
        TerminationFlag, TracingProgress,
    },
    hdbscan::Hdbscan,
    hierarchy::{ClusterHierarchy, CondensedTree, HierarchyError},
    kdtree::{KdTree, KdTreeBuilder, KdTreeError},
    mst::{BoruvkaTraversal, MinimumSpanningTree, MstEdge, MstError, boruvka_mst},
    result::{ClusterId, HdbscanResult, Labels, NOISE, NonContiguousClusterIds},
    vectors::{Coordinate, VectorSource},
};
