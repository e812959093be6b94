//! Benchmark setup error type.
//!
//! Aggregates the errors that may arise during benchmark data preparation so
//! that setup functions can propagate failures with `?` instead of using
//! `.expect()`.

use crate::source::SyntheticError;
use hdbstar_core::{ExecutionError, HdbscanError, HierarchyError, KdTreeError, MstError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic source generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Source validation failed.
    #[error("source validation failed: {0}")]
    Hdbscan(#[from] HdbscanError),
    /// The worker pool could not be built or the run was cancelled.
    #[error("execution failed: {0}")]
    Execution(#[from] ExecutionError),
    /// KD-tree construction failed.
    #[error("KD-tree build failed: {0}")]
    KdTree(#[from] KdTreeError),
    /// Spanning tree computation failed.
    #[error("MST computation failed: {0}")]
    Mst(#[from] MstError),
    /// Hierarchy construction failed.
    #[error("hierarchy extraction failed: {0}")]
    Hierarchy(#[from] HierarchyError),
    /// A zero value was passed where a non-zero integer was required.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// A description of the parameter that was unexpectedly zero.
        context: &'static str,
    },
}
