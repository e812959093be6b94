//! Error types for the hdbstar core library.
//!
//! Defines the top-level error enum exposed by the public API, the error
//! raised by point-vector sources, and a convenient result alias. Phase
//! specific errors live beside their phases and convert into
//! [`HdbscanError`] so the orchestrator can propagate them with `?`.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    execution::{ExecutionError, Phase},
    hierarchy::HierarchyError,
    kdtree::KdTreeError,
    mst::MstError,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::core::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// An error produced by [`crate::VectorSource`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum VectorSourceError {
    /// Requested index was outside the source's bounds.
    #[error("index {index} is out of bounds")]
    OutOfBounds {
        /// The requested row that exceeded the source bounds.
        index: usize,
    },
    /// A row did not have the dimensionality reported by the source.
    #[error("row {index} has dimension {actual} but the source reports {expected}")]
    DimensionMismatch {
        /// Row that carried the unexpected dimensionality.
        index: usize,
        /// Dimensionality reported by [`crate::VectorSource::dimension`].
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// A coordinate was NaN or infinite.
    #[error("row {index} contains a non-finite value in dimension {dimension}")]
    NonFinite {
        /// Row containing the non-finite coordinate.
        index: usize,
        /// Dimension of the non-finite coordinate.
        dimension: usize,
    },
    /// Vector source contained no rows.
    #[error("vector source contains no rows")]
    EmptyData,
    /// Vector source rows must have positive dimension.
    #[error("vector source rows must have positive dimension")]
    ZeroDimension,
}

define_error_codes! {
    /// Stable codes describing [`VectorSourceError`] variants.
    enum VectorSourceErrorCode for VectorSourceError {
        /// Requested index was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "VECTOR_SOURCE_OUT_OF_BOUNDS",
        /// A row did not have the reported dimensionality.
        DimensionMismatch => DimensionMismatch { .. } => "VECTOR_SOURCE_DIMENSION_MISMATCH",
        /// A coordinate was NaN or infinite.
        NonFinite => NonFinite { .. } => "VECTOR_SOURCE_NON_FINITE",
        /// Vector source contained no rows.
        EmptyData => EmptyData => "VECTOR_SOURCE_EMPTY",
        /// Vector source rows must have positive dimension.
        ZeroDimension => ZeroDimension => "VECTOR_SOURCE_ZERO_DIMENSION",
    }
}

/// Error type produced when constructing or running [`crate::Hdbscan`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum HdbscanError {
    /// Minimum cluster size must be greater than zero.
    #[error("min_cluster_size must be at least 1 (got {got})")]
    InvalidMinClusterSize {
        /// The invalid minimum cluster size supplied by the caller.
        got: usize,
    },
    /// The neighbour count used for core distances must be greater than zero.
    #[error("samples must be at least 1 (got {got})")]
    InvalidSamples {
        /// The invalid sample count supplied by the caller.
        got: usize,
    },
    /// KD-tree leaves must hold at least one point.
    #[error("leaf_size must be at least 1 (got {got})")]
    InvalidLeafSize {
        /// The invalid leaf size supplied by the caller.
        got: usize,
    },
    /// The worker pool needs at least one thread.
    #[error("concurrency must be at least 1 (got {got})")]
    InvalidConcurrency {
        /// The invalid concurrency supplied by the caller.
        got: usize,
    },
    /// The supplied [`crate::VectorSource`] contained no items.
    #[error("vector source `{data_source}` contains no items")]
    EmptySource {
        /// Identifier for the empty data source.
        data_source: Arc<str>,
    },
    /// A [`crate::VectorSource`] operation failed while running the algorithm.
    #[error("vector source `{data_source}` failed: {error}")]
    VectorSource {
        /// Identifier for the data source that produced the error.
        data_source: Arc<str>,
        #[source]
        /// Underlying error bubbled up by the source.
        error: VectorSourceError,
    },
    /// The run observed a cancellation request.
    #[error("run cancelled during {phase}")]
    Cancelled {
        /// Phase that observed the request.
        phase: Phase,
    },
    /// A pipeline phase failed.
    #[error("{phase} failed with {code}: {message}")]
    PhaseFailure {
        /// Phase that failed.
        phase: Phase,
        /// Stable code reported by the phase error.
        code: &'static str,
        /// Human-readable description of the failure.
        message: Arc<str>,
    },
    /// The worker pool could not be created.
    #[error("failed to build worker pool: {message}")]
    ThreadPool {
        /// Message reported by the thread pool builder.
        message: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`HdbscanError`] variants.
    enum HdbscanErrorCode for HdbscanError {
        /// Minimum cluster size must be greater than zero.
        InvalidMinClusterSize => InvalidMinClusterSize { .. } => "HDBSTAR_INVALID_MIN_CLUSTER_SIZE",
        /// Sample count must be greater than zero.
        InvalidSamples => InvalidSamples { .. } => "HDBSTAR_INVALID_SAMPLES",
        /// Leaf size must be greater than zero.
        InvalidLeafSize => InvalidLeafSize { .. } => "HDBSTAR_INVALID_LEAF_SIZE",
        /// Concurrency must be greater than zero.
        InvalidConcurrency => InvalidConcurrency { .. } => "HDBSTAR_INVALID_CONCURRENCY",
        /// The supplied source contained no items.
        EmptySource => EmptySource { .. } => "HDBSTAR_EMPTY_SOURCE",
        /// A vector source operation failed.
        VectorSourceFailure => VectorSource { .. } => "HDBSTAR_VECTOR_SOURCE_FAILURE",
        /// The run was cancelled.
        Cancelled => Cancelled { .. } => "HDBSTAR_CANCELLED",
        /// A pipeline phase failed.
        PhaseFailure => PhaseFailure { .. } => "HDBSTAR_PHASE_FAILURE",
        /// The worker pool could not be created.
        ThreadPool => ThreadPool { .. } => "HDBSTAR_THREAD_POOL",
    }
}

impl HdbscanError {
    /// Retrieve the inner [`VectorSourceErrorCode`] when the error originated
    /// in a [`crate::VectorSource`].
    #[must_use]
    pub const fn vector_source_code(&self) -> Option<VectorSourceErrorCode> {
        match self {
            Self::VectorSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns `true` when the run stopped because of a cancellation request.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    fn phase_failure(phase: Phase, code: &'static str, message: String) -> Self {
        Self::PhaseFailure {
            phase,
            code,
            message: Arc::from(message),
        }
    }
}

impl From<ExecutionError> for HdbscanError {
    fn from(error: ExecutionError) -> Self {
        match error {
            ExecutionError::Cancelled { phase } => Self::Cancelled { phase },
            ExecutionError::ThreadPool { message } => Self::ThreadPool { message },
        }
    }
}

impl From<KdTreeError> for HdbscanError {
    fn from(error: KdTreeError) -> Self {
        match error {
            KdTreeError::Execution { source } => source.into(),
            other => Self::phase_failure(Phase::KdTree, other.code().as_str(), other.to_string()),
        }
    }
}

impl From<MstError> for HdbscanError {
    fn from(error: MstError) -> Self {
        match error {
            MstError::Execution(inner) => inner.into(),
            other => Self::phase_failure(Phase::Boruvka, other.code().as_str(), other.to_string()),
        }
    }
}

impl From<HierarchyError> for HdbscanError {
    fn from(error: HierarchyError) -> Self {
        match error {
            HierarchyError::Execution(inner) => inner.into(),
            other => Self::phase_failure(Phase::Hierarchy, other.code().as_str(), other.to_string()),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, HdbscanError>;
