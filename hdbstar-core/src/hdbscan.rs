//! Pipeline orchestration for HDBSCAN* runs.
//!
//! Provides the [`Hdbscan`] entry point, which validates a
//! [`VectorSource`], builds the spatial index and core distances, grows the
//! mutual-reachability spanning tree and extracts the final labels.

use std::{num::NonZeroUsize, sync::Arc};

use tracing::{debug, info, instrument, warn};

use crate::{
    Result,
    core_distance::{CoreDistances, core_distances},
    distance::Distances,
    error::HdbscanError,
    execution::{Execution, Phase, ProgressSink, SilentProgress, TerminationFlag},
    hierarchy::{ClusterHierarchy, CondensedTree, label_points, select_clusters, stability},
    kdtree::KdTreeBuilder,
    mst::{BoruvkaTraversal, MinimumSpanningTree, boruvka_mst},
    result::{HdbscanResult, Labels, NOISE},
    vectors::VectorSource,
};

/// Entry point for running the clustering pipeline.
///
/// # Examples
/// ```
/// use hdbstar_core::{HdbscanBuilder, VectorSource, VectorSourceError};
///
/// struct Line(Vec<[f64; 1]>);
///
/// impl VectorSource for Line {
///     type Coordinate = f64;
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn dimension(&self) -> usize { 1 }
///     fn vector(&self, index: usize) -> Result<&[f64], VectorSourceError> {
///         self.0.get(index).map(|row| row.as_slice()).ok_or(VectorSourceError::OutOfBounds { index })
///     }
/// }
///
/// let hdbscan = HdbscanBuilder::new()
///     .with_min_cluster_size(2)
///     .with_samples(1)
///     .build()?;
/// let result = hdbscan.run(&Line(vec![[0.0], [0.5], [9.0], [9.5]]))?;
/// assert_eq!(result.labels().labels(), &[0, 0, 1, 1]);
/// assert_eq!(result.spanning_tree().len(), 3);
/// # Ok::<(), hdbstar_core::HdbscanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Hdbscan {
    min_cluster_size: NonZeroUsize,
    samples: NonZeroUsize,
    leaf_size: NonZeroUsize,
    traversal: BoruvkaTraversal,
    concurrency: NonZeroUsize,
}

impl Hdbscan {
    pub(crate) fn new(
        min_cluster_size: NonZeroUsize,
        samples: NonZeroUsize,
        leaf_size: NonZeroUsize,
        traversal: BoruvkaTraversal,
        concurrency: NonZeroUsize,
    ) -> Self {
        Self {
            min_cluster_size,
            samples,
            leaf_size,
            traversal,
            concurrency,
        }
    }

    /// Returns the minimum cluster size configured for this instance.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_cluster_size(&self) -> NonZeroUsize { self.min_cluster_size }

    /// Returns the neighbour count used for core distances.
    #[must_use]
    #[rustfmt::skip]
    pub fn samples(&self) -> NonZeroUsize { self.samples }

    /// Returns the KD-tree leaf size.
    #[must_use]
    #[rustfmt::skip]
    pub fn leaf_size(&self) -> NonZeroUsize { self.leaf_size }

    /// Returns the Boruvka search strategy.
    #[must_use]
    #[rustfmt::skip]
    pub fn traversal(&self) -> BoruvkaTraversal { self.traversal }

    /// Returns the number of worker threads.
    #[must_use]
    #[rustfmt::skip]
    pub fn concurrency(&self) -> NonZeroUsize { self.concurrency }

    /// Clusters `source` without cancellation or progress reporting.
    ///
    /// # Errors
    /// See [`Self::run_with`].
    pub fn run<S: VectorSource>(&self, source: &S) -> Result<HdbscanResult> {
        self.run_with(source, TerminationFlag::running(), Arc::new(SilentProgress))
    }

    /// Clusters `source`, observing `termination` between units of work and
    /// reporting completed units to `progress`.
    ///
    /// # Errors
    /// Returns [`HdbscanError::EmptySource`] when the source has no rows,
    /// [`HdbscanError::VectorSource`] when a row is missing, ragged or
    /// non-finite, [`HdbscanError::Cancelled`] once `termination` is
    /// cancelled, [`HdbscanError::ThreadPool`] when the workers cannot be
    /// spawned and [`HdbscanError::PhaseFailure`] when a phase rejects its
    /// input.
    #[instrument(
        name = "core.run",
        err,
        skip(self, source, termination, progress),
        fields(
            data_source = %source.name(),
            points = source.len(),
            min_cluster_size = %self.min_cluster_size,
            samples = %self.samples,
            traversal = %self.traversal,
        ),
    )]
    pub fn run_with<S: VectorSource>(
        &self,
        source: &S,
        termination: TerminationFlag,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<HdbscanResult> {
        if source.is_empty() {
            warn!(data_source = source.name(), "vector source is empty, returning error");
            return Err(HdbscanError::EmptySource {
                data_source: Arc::from(source.name()),
            });
        }

        let execution = Execution::new(self.concurrency.get(), termination, progress)?;
        let distances = Distances::new(source, &execution)?;
        let point_count = distances.len();
        if point_count == 1 {
            debug!("single point, skipping the pipeline");
            return Ok(HdbscanResult::new(
                Labels::from_contiguous(vec![NOISE]),
                MinimumSpanningTree::new(1, Vec::new()),
                CoreDistances::from_squared(vec![0.0]),
            ));
        }

        let tree = KdTreeBuilder::new(&distances, &execution)
            .leaf_size(self.leaf_size.get())
            .build()?;
        let core = core_distances(&tree, &distances, self.samples, &execution)?;
        let spanning_tree = boruvka_mst(&tree, &distances, &core, self.traversal, &execution)?;

        let hierarchy =
            ClusterHierarchy::from_spanning_tree_with(&spanning_tree, execution.termination())?;
        execution.report(Phase::Hierarchy, spanning_tree.len());

        let condensed = CondensedTree::condense_with(
            &hierarchy,
            self.min_cluster_size,
            execution.termination(),
        )?;
        execution.report(Phase::Condense, hierarchy.node_count() - point_count);

        execution.check(Phase::Extract)?;
        let scores = stability(&condensed);
        let selected = select_clusters(&condensed, &scores);
        let labels = label_points(&condensed, &selected);
        execution.report(Phase::Extract, point_count);

        info!(
            clusters = labels.cluster_count(),
            noise = labels.noise_point_count(),
            "run completed"
        );
        Ok(HdbscanResult::new(labels, spanning_tree, core))
    }
}
