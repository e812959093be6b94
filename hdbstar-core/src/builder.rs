//! Builder utilities for configuring HDBSCAN* runs.
//!
//! Exposes the tunable parameters and the validation performed before
//! constructing [`Hdbscan`] instances.

use std::{num::NonZeroUsize, thread};

use crate::{
    Result, error::HdbscanError, hdbscan::Hdbscan, kdtree::DEFAULT_LEAF_SIZE,
    mst::BoruvkaTraversal,
};

/// Default minimum number of points a cluster must hold.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 5;

/// Default neighbour count used for core distances.
pub const DEFAULT_SAMPLES: usize = 10;

/// Configures and constructs [`Hdbscan`] instances.
///
/// # Examples
/// ```
/// use hdbstar_core::{BoruvkaTraversal, HdbscanBuilder};
///
/// let hdbscan = HdbscanBuilder::new()
///     .with_min_cluster_size(8)
///     .with_traversal(BoruvkaTraversal::DualTree)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(hdbscan.min_cluster_size().get(), 8);
/// assert_eq!(hdbscan.traversal(), BoruvkaTraversal::DualTree);
/// ```
#[derive(Debug, Clone)]
pub struct HdbscanBuilder {
    min_cluster_size: usize,
    samples: usize,
    leaf_size: usize,
    traversal: BoruvkaTraversal,
    concurrency: usize,
}

impl Default for HdbscanBuilder {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            samples: DEFAULT_SAMPLES,
            leaf_size: DEFAULT_LEAF_SIZE,
            traversal: BoruvkaTraversal::default(),
            concurrency: thread::available_parallelism().map_or(1, NonZeroUsize::get),
        }
    }
}

impl HdbscanBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use hdbstar_core::{BoruvkaTraversal, HdbscanBuilder};
    ///
    /// let builder = HdbscanBuilder::new();
    /// assert_eq!(builder.min_cluster_size(), 5);
    /// assert_eq!(builder.samples(), 10);
    /// assert_eq!(builder.traversal(), BoruvkaTraversal::SingleTree);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the minimum cluster size.
    #[must_use]
    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }

    /// Returns the configured minimum cluster size.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_cluster_size(&self) -> usize { self.min_cluster_size }

    /// Overrides the neighbour count used for core distances.
    ///
    /// The count excludes the point itself.
    ///
    /// # Examples
    /// ```
    /// use hdbstar_core::HdbscanBuilder;
    ///
    /// let builder = HdbscanBuilder::new().with_samples(3);
    /// assert_eq!(builder.samples(), 3);
    /// ```
    #[must_use]
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Returns the configured neighbour count.
    #[must_use]
    #[rustfmt::skip]
    pub fn samples(&self) -> usize { self.samples }

    /// Overrides the maximum number of points per KD-tree leaf.
    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Returns the configured leaf size.
    #[must_use]
    #[rustfmt::skip]
    pub fn leaf_size(&self) -> usize { self.leaf_size }

    /// Selects the Boruvka search strategy.
    #[must_use]
    pub fn with_traversal(mut self, traversal: BoruvkaTraversal) -> Self {
        self.traversal = traversal;
        self
    }

    /// Returns the configured Boruvka search strategy.
    #[must_use]
    #[rustfmt::skip]
    pub fn traversal(&self) -> BoruvkaTraversal { self.traversal }

    /// Overrides the number of worker threads.
    ///
    /// # Examples
    /// ```
    /// use hdbstar_core::HdbscanBuilder;
    ///
    /// let builder = HdbscanBuilder::new().with_concurrency(2);
    /// assert_eq!(builder.concurrency(), 2);
    /// ```
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Returns the configured number of worker threads.
    #[must_use]
    #[rustfmt::skip]
    pub fn concurrency(&self) -> usize { self.concurrency }

    /// Validates the configuration and constructs an [`Hdbscan`] instance.
    ///
    /// # Errors
    /// Returns [`HdbscanError::InvalidMinClusterSize`],
    /// [`HdbscanError::InvalidSamples`], [`HdbscanError::InvalidLeafSize`] or
    /// [`HdbscanError::InvalidConcurrency`] when the matching setting is zero.
    ///
    /// # Examples
    /// ```
    /// use hdbstar_core::{HdbscanBuilder, HdbscanError};
    ///
    /// let err = HdbscanBuilder::new().with_samples(0).build().expect_err("zero samples");
    /// assert_eq!(err, HdbscanError::InvalidSamples { got: 0 });
    /// ```
    pub fn build(self) -> Result<Hdbscan> {
        let min_cluster_size = NonZeroUsize::new(self.min_cluster_size).ok_or(
            HdbscanError::InvalidMinClusterSize {
                got: self.min_cluster_size,
            },
        )?;
        let samples = NonZeroUsize::new(self.samples).ok_or(HdbscanError::InvalidSamples {
            got: self.samples,
        })?;
        let leaf_size = NonZeroUsize::new(self.leaf_size).ok_or(HdbscanError::InvalidLeafSize {
            got: self.leaf_size,
        })?;
        let concurrency = NonZeroUsize::new(self.concurrency).ok_or(
            HdbscanError::InvalidConcurrency {
                got: self.concurrency,
            },
        )?;

        Ok(Hdbscan::new(
            min_cluster_size,
            samples,
            leaf_size,
            self.traversal,
            concurrency,
        ))
    }
}
