//! Result types for clustering runs.
//!
//! Provides the per-point labels produced by extraction, validation of the
//! cluster identifier constraints, and the bundle returned by
//! [`Hdbscan::run`](crate::Hdbscan::run).

use thiserror::Error;

use crate::{core_distance::CoreDistances, mst::MinimumSpanningTree};

/// Label assigned to points that belong to no cluster.
pub const NOISE: i64 = -1;

/// Per-point cluster labels.
///
/// Cluster labels are contiguous non-negative integers starting at zero;
/// noise points carry [`NOISE`].
///
/// # Examples
/// ```
/// use hdbstar_core::Labels;
///
/// let labels = Labels::try_from_labels(vec![0, 0, -1, 1]).expect("labels are contiguous");
/// assert_eq!(labels.cluster_count(), 2);
/// assert_eq!(labels.noise_point_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    labels: Vec<i64>,
    noise_point_count: usize,
    cluster_count: usize,
}

/// Error returned when cluster labels are not contiguous starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterIds {
    /// Labels name clusters but omit cluster `0`.
    #[error("cluster identifiers must include 0")]
    MissingZero,
    /// The labels skip identifiers.
    #[error("cluster identifiers must be contiguous without gaps")]
    Gap,
    /// A label is negative but not the noise marker.
    #[error("label {label} is neither a cluster identifier nor noise")]
    InvalidLabel {
        /// The rejected label.
        label: i64,
    },
}

impl Labels {
    /// Attempts to build labels from raw per-point values.
    ///
    /// An empty vector, or one holding only noise, yields
    /// `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterIds::InvalidLabel`] for negative values
    /// other than [`NOISE`], [`NonContiguousClusterIds::MissingZero`] when
    /// clusters exist but `0` is absent, and [`NonContiguousClusterIds::Gap`]
    /// when identifiers skip values.
    ///
    /// # Examples
    /// ```
    /// use hdbstar_core::{Labels, NonContiguousClusterIds};
    ///
    /// let err = Labels::try_from_labels(vec![0, 2]).expect_err("1 is missing");
    /// assert_eq!(err, NonContiguousClusterIds::Gap);
    /// ```
    pub fn try_from_labels(labels: Vec<i64>) -> Result<Self, NonContiguousClusterIds> {
        let mut seen = Vec::new();
        for &label in &labels {
            if label == NOISE {
                continue;
            }
            let index =
                usize::try_from(label).map_err(|_| NonContiguousClusterIds::InvalidLabel { label })?;
            if index >= seen.len() {
                seen.resize(index + 1, false);
            }
            seen[index] = true;
        }

        match seen.first() {
            None => {}
            Some(false) => return Err(NonContiguousClusterIds::MissingZero),
            Some(true) if seen.contains(&false) => return Err(NonContiguousClusterIds::Gap),
            Some(true) => {}
        }

        Ok(Self::with_cluster_count(labels, seen.len()))
    }

    /// Wraps labels already known to be contiguous.
    pub(crate) fn from_contiguous(labels: Vec<i64>) -> Self {
        let cluster_count = labels
            .iter()
            .copied()
            .max()
            .and_then(|max| usize::try_from(max + 1).ok())
            .unwrap_or(0);
        Self::with_cluster_count(labels, cluster_count)
    }

    fn with_cluster_count(labels: Vec<i64>, cluster_count: usize) -> Self {
        let noise_point_count = labels.iter().filter(|&&label| label == NOISE).count();
        Self {
            labels,
            noise_point_count,
            cluster_count,
        }
    }

    /// Returns the raw label of every point, in point order.
    #[must_use]
    #[rustfmt::skip]
    pub fn labels(&self) -> &[i64] { &self.labels }

    /// Returns the label of `point`, if it exists.
    #[must_use]
    pub fn get(&self, point: usize) -> Option<i64> {
        self.labels.get(point).copied()
    }

    /// Returns the number of labelled points.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.labels.len() }

    /// Returns `true` when no points were labelled.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// Returns the number of points labelled as noise.
    #[must_use]
    #[rustfmt::skip]
    pub fn noise_point_count(&self) -> usize { self.noise_point_count }

    /// Returns the number of distinct clusters.
    #[must_use]
    #[rustfmt::skip]
    pub fn cluster_count(&self) -> usize { self.cluster_count }

    /// Returns each point's cluster, with noise as `None`.
    ///
    /// # Examples
    /// ```
    /// use hdbstar_core::{ClusterId, Labels};
    ///
    /// let labels = Labels::try_from_labels(vec![-1, 0]).expect("labels are contiguous");
    /// assert_eq!(labels.assignments(), vec![None, Some(ClusterId::new(0))]);
    /// ```
    #[must_use]
    pub fn assignments(&self) -> Vec<Option<ClusterId>> {
        self.labels
            .iter()
            .map(|&label| u64::try_from(label).ok().map(ClusterId::new))
            .collect()
    }

    /// Returns the number of points in each cluster, indexed by cluster id.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.cluster_count];
        for label in self.labels.iter().filter_map(|&label| usize::try_from(label).ok()) {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Identifier assigned to a cluster.
///
/// # Examples
/// ```
/// use hdbstar_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn get(self) -> u64 { self.0 }
}

/// Output of a full clustering run.
///
/// Carries the terminal labels together with the intermediate spanning tree
/// and core distances for callers that post-process them.
#[derive(Debug, Clone)]
pub struct HdbscanResult {
    labels: Labels,
    spanning_tree: MinimumSpanningTree,
    core_distances: CoreDistances,
}

impl HdbscanResult {
    pub(crate) fn new(
        labels: Labels,
        spanning_tree: MinimumSpanningTree,
        core_distances: CoreDistances,
    ) -> Self {
        Self {
            labels,
            spanning_tree,
            core_distances,
        }
    }

    /// Returns the per-point labels.
    #[must_use]
    #[rustfmt::skip]
    pub fn labels(&self) -> &Labels { &self.labels }

    /// Returns the mutual-reachability minimum spanning tree.
    #[must_use]
    #[rustfmt::skip]
    pub fn spanning_tree(&self) -> &MinimumSpanningTree { &self.spanning_tree }

    /// Returns the core distance of every point.
    #[must_use]
    #[rustfmt::skip]
    pub fn core_distances(&self) -> &CoreDistances { &self.core_distances }

    /// Consumes the result and returns its labels.
    #[must_use]
    pub fn into_labels(self) -> Labels {
        self.labels
    }
}
