//! Parallel task runner, cooperative cancellation and progress reporting.
//!
//! Every parallel region of the pipeline goes through
//! [`Execution::run_partitioned`], which splits an index space into
//! contiguous ranges, runs them on a dedicated Rayon pool, polls the
//! [`TerminationFlag`] before each unit and reports completed units to the
//! configured [`ProgressSink`].

mod progress;

use std::{
    fmt,
    ops::Range,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use thiserror::Error;

use crate::error::define_error_codes;

pub use self::progress::{ProgressSink, SilentProgress, TracingProgress};

/// Units of work scheduled per worker thread by [`Execution::run_partitioned`].
const UNITS_PER_THREAD: usize = 4;

pub(crate) const PHASE_COUNT: usize = 7;

/// Named pipeline phase used for cancellation and progress reporting.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Phase {
    /// Row validation of the vector source.
    Validation,
    /// KD-tree construction.
    KdTree,
    /// Per-point k-nearest-neighbour search.
    CoreDistances,
    /// Boruvka rounds of the mutual-reachability MST.
    Boruvka,
    /// Single-linkage hierarchy construction.
    Hierarchy,
    /// Condensation of the hierarchy.
    Condense,
    /// Stability scoring, cluster selection and labelling.
    Extract,
}

impl Phase {
    /// Every phase in pipeline order.
    pub const ALL: [Self; PHASE_COUNT] = [
        Self::Validation,
        Self::KdTree,
        Self::CoreDistances,
        Self::Boruvka,
        Self::Hierarchy,
        Self::Condense,
        Self::Extract,
    ];

    /// Returns the stable identifier used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::KdTree => "kdtree",
            Self::CoreDistances => "core_distances",
            Self::Boruvka => "boruvka",
            Self::Hierarchy => "hierarchy",
            Self::Condense => "condense",
            Self::Extract => "extract",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Validation => 0,
            Self::KdTree => 1,
            Self::CoreDistances => 2,
            Self::Boruvka => 3,
            Self::Hierarchy => 4,
            Self::Condense => 5,
            Self::Extract => 6,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the task runner.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ExecutionError {
    /// A unit of work observed the termination flag.
    #[error("cancelled during {phase}")]
    Cancelled {
        /// Phase that observed the request.
        phase: Phase,
    },
    /// The worker pool could not be built.
    #[error("failed to build worker pool: {message}")]
    ThreadPool {
        /// Message reported by Rayon.
        message: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`ExecutionError`] variants.
    enum ExecutionErrorCode for ExecutionError {
        /// A unit of work observed the termination flag.
        Cancelled => Cancelled { .. } => "EXECUTION_CANCELLED",
        /// The worker pool could not be built.
        ThreadPool => ThreadPool { .. } => "EXECUTION_THREAD_POOL",
    }
}

/// Cooperative cancellation flag shared between a caller and a run.
///
/// Cloning the flag shares the underlying state, so a caller can keep one
/// clone and cancel a run that owns another.
///
/// # Examples
/// ```
/// use hdbstar_core::{Phase, TerminationFlag};
///
/// let flag = TerminationFlag::running();
/// let handle = flag.clone();
/// assert!(flag.check(Phase::Boruvka).is_ok());
/// handle.cancel();
/// assert!(flag.is_cancelled());
/// assert!(flag.check(Phase::Boruvka).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TerminationFlag(Arc<AtomicBool>);

impl TerminationFlag {
    /// Creates a flag that has not been cancelled.
    #[must_use]
    pub fn running() -> Self {
        Self::default()
    }

    /// Requests cancellation of every run observing this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`Self::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Fails with [`ExecutionError::Cancelled`] when cancellation was requested.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Cancelled`] tagged with `phase`.
    pub fn check(&self, phase: Phase) -> Result<(), ExecutionError> {
        if self.is_cancelled() {
            return Err(ExecutionError::Cancelled { phase });
        }
        Ok(())
    }
}

/// Worker pool, termination flag and progress sink used by one run.
pub struct Execution {
    pool: ThreadPool,
    concurrency: usize,
    termination: TerminationFlag,
    progress: Arc<dyn ProgressSink>,
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Execution")
            .field("concurrency", &self.concurrency)
            .field("termination", &self.termination)
            .finish_non_exhaustive()
    }
}

impl Execution {
    /// Builds a dedicated pool with `concurrency` worker threads.
    ///
    /// A concurrency of zero is treated as one.
    ///
    /// # Errors
    /// Returns [`ExecutionError::ThreadPool`] when Rayon cannot spawn the
    /// workers.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use hdbstar_core::{Execution, Phase, SilentProgress, TerminationFlag};
    ///
    /// let execution = Execution::new(2, TerminationFlag::running(), Arc::new(SilentProgress))?;
    /// let sums = execution.run_partitioned(Phase::CoreDistances, 10, |range| {
    ///     Ok::<usize, hdbstar_core::ExecutionError>(range.sum())
    /// })?;
    /// assert_eq!(sums.iter().sum::<usize>(), 45);
    /// # Ok::<(), hdbstar_core::ExecutionError>(())
    /// ```
    pub fn new(
        concurrency: usize,
        termination: TerminationFlag,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Self, ExecutionError> {
        let concurrency = concurrency.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .thread_name(|index| format!("hdbstar-worker-{index}"))
            .build()
            .map_err(|error| ExecutionError::ThreadPool {
                message: Arc::from(error.to_string()),
            })?;
        Ok(Self {
            pool,
            concurrency,
            termination,
            progress,
        })
    }

    /// Returns the number of worker threads.
    #[must_use]
    #[rustfmt::skip]
    pub fn concurrency(&self) -> usize { self.concurrency }

    /// Returns the termination flag observed by this run.
    #[must_use]
    #[rustfmt::skip]
    pub fn termination(&self) -> &TerminationFlag { &self.termination }

    /// Polls the termination flag at a serial loop boundary.
    ///
    /// # Errors
    /// Returns [`ExecutionError::Cancelled`] when cancellation was requested.
    pub fn check(&self, phase: Phase) -> Result<(), ExecutionError> {
        self.termination.check(phase)
    }

    /// Reports `units` completed units of work for `phase`.
    pub fn report(&self, phase: Phase, units: usize) {
        self.progress.log_progress(phase, units);
    }

    /// Runs `operation` inside the worker pool.
    pub fn install<R, F>(&self, operation: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(operation)
    }

    /// Runs `body` over contiguous ranges covering `0..len` in parallel.
    ///
    /// Results are returned in range order. Each unit polls the termination
    /// flag before it starts and reports its length once it completes. The
    /// first failure stops further units from being scheduled and is
    /// returned to the caller.
    ///
    /// # Errors
    /// Returns the first error produced by `body`, or
    /// [`ExecutionError::Cancelled`] converted into `E` when the flag is set.
    pub fn run_partitioned<R, E, F>(&self, phase: Phase, len: usize, body: F) -> Result<Vec<R>, E>
    where
        R: Send,
        E: From<ExecutionError> + Send,
        F: Fn(Range<usize>) -> Result<R, E> + Sync,
    {
        let ranges = partition(len, self.concurrency.saturating_mul(UNITS_PER_THREAD));
        self.pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| {
                    self.termination.check(phase)?;
                    let units = range.len();
                    let output = body(range)?;
                    self.progress.log_progress(phase, units);
                    Ok(output)
                })
                .collect()
        })
    }
}

/// Splits `0..len` into at most `parts` contiguous, non-empty ranges whose
/// lengths differ by at most one.
pub(crate) fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.clamp(1, len.max(1));
    if len == 0 {
        return Vec::new();
    }
    let base = len / parts;
    let remainder = len % parts;
    let mut start = 0;
    (0..parts)
        .map(|part| {
            let size = base + usize::from(part < remainder);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}
