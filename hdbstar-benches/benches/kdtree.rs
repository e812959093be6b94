//! KD-tree construction and core-distance benchmarks.
//!
//! Measures the time to build the KD-tree over a Gaussian blob dataset and,
//! separately, the time to answer one k-nearest-neighbour query per point
//! against the finished tree.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
#![expect(
    clippy::excessive_nesting,
    reason = "Criterion bench_with_input + b.iter pattern requires deep nesting"
)]

use std::{num::NonZeroUsize, sync::Arc};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use hdbstar_benches::{
    error::BenchSetupError,
    params::PipelineBenchParams,
    source::{Anisotropy, GaussianBlobConfig, SyntheticSource},
};
use hdbstar_core::{
    Distances, Execution, KdTreeBuilder, SilentProgress, TerminationFlag, core_distances,
    kdtree::DEFAULT_LEAF_SIZE,
};

/// Seed used for all synthetic data generation in this benchmark.
const SEED: u64 = 42;

/// Vector dimensionality for all benchmark datasets.
const DIMENSIONS: usize = 8;

/// Dataset sizes to benchmark.
const POINT_COUNTS: &[usize] = &[500, 2_000, 8_000];

/// Neighbour rank used for core distances.
const SAMPLES: usize = 10;

fn blobs(point_count: usize) -> Result<SyntheticSource, BenchSetupError> {
    Ok(SyntheticSource::generate_gaussian_blobs(
        &GaussianBlobConfig {
            point_count,
            dimensions: DIMENSIONS,
            cluster_count: 4,
            separation: 6.0,
            anisotropy: Anisotropy::Isotropic(1.0),
            seed: SEED,
        },
    )?)
}

#[expect(
    clippy::panic_in_result_fn,
    reason = "Criterion measurement closures cannot propagate errors via Result"
)]
fn kdtree_build_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("kdtree_build");
    group.sample_size(20);
    let execution = Execution::new(1, TerminationFlag::running(), Arc::new(SilentProgress))?;

    for &point_count in POINT_COUNTS {
        let source = blobs(point_count)?;
        let distances = Distances::new(&source, &execution)?;
        let bench_params = PipelineBenchParams { point_count };

        group.bench_with_input(
            BenchmarkId::from_parameter(&bench_params),
            &distances,
            |b, distances| {
                b.iter(|| {
                    if let Err(err) = KdTreeBuilder::new(distances, &execution)
                        .leaf_size(DEFAULT_LEAF_SIZE)
                        .build()
                    {
                        panic!("KD-tree build failed during benchmark: {err}");
                    }
                });
            },
        );
    }

    group.finish();
    Ok(())
}

#[expect(
    clippy::panic_in_result_fn,
    reason = "Criterion measurement closures cannot propagate errors via Result"
)]
fn core_distances_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("core_distances");
    group.sample_size(20);
    let execution = Execution::new(1, TerminationFlag::running(), Arc::new(SilentProgress))?;
    let samples = NonZeroUsize::new(SAMPLES).ok_or(BenchSetupError::ZeroValue {
        context: "samples",
    })?;

    for &point_count in POINT_COUNTS {
        let source = blobs(point_count)?;
        let distances = Distances::new(&source, &execution)?;
        let tree = KdTreeBuilder::new(&distances, &execution)
            .leaf_size(DEFAULT_LEAF_SIZE)
            .build()?;
        let bench_params = PipelineBenchParams { point_count };

        group.bench_with_input(
            BenchmarkId::from_parameter(&bench_params),
            &(&tree, &distances),
            |b, &(tree, distances)| {
                b.iter(|| {
                    if let Err(err) = core_distances(tree, distances, samples, &execution) {
                        panic!("core distances failed during benchmark: {err}");
                    }
                });
            },
        );
    }

    group.finish();
    Ok(())
}

fn kdtree_build(c: &mut Criterion) {
    if let Err(err) = kdtree_build_impl(c) {
        panic!("kdtree_build benchmark setup failed: {err}");
    }
}

fn kdtree_core_distances(c: &mut Criterion) {
    if let Err(err) = core_distances_impl(c) {
        panic!("core_distances benchmark setup failed: {err}");
    }
}

criterion_group!(benches, kdtree_build, kdtree_core_distances);
criterion_main!(benches);
