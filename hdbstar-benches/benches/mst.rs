//! Boruvka minimum spanning tree (MST) benchmarks.
//!
//! Compares the single-tree and dual-tree traversals on the same KD-tree and
//! core distances, isolating the spanning tree from the preceding phases.
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
    params::MstBenchParams,
    source::{SyntheticConfig, SyntheticSource},
};
use hdbstar_core::{
    BoruvkaTraversal, Distances, Execution, KdTreeBuilder, SilentProgress, TerminationFlag,
    boruvka_mst, core_distances, kdtree::DEFAULT_LEAF_SIZE,
};

/// Seed used for all synthetic data generation in this benchmark.
const SEED: u64 = 42;

/// Vector dimensionality for all benchmark datasets.
const DIMENSIONS: usize = 4;

/// Dataset sizes to benchmark.
const POINT_COUNTS: &[usize] = &[500, 2_000, 8_000];

/// Traversals compared at each size.
const TRAVERSALS: &[BoruvkaTraversal] = &[
    BoruvkaTraversal::SingleTree,
    BoruvkaTraversal::DualTree,
];

/// Neighbour rank used for core distances.
const SAMPLES: usize = 5;

#[expect(
    clippy::panic_in_result_fn,
    reason = "Criterion measurement closures cannot propagate errors via Result"
)]
fn boruvka_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("boruvka_mst");
    group.sample_size(10);
    let execution = Execution::new(1, TerminationFlag::running(), Arc::new(SilentProgress))?;
    let samples = NonZeroUsize::new(SAMPLES).ok_or(BenchSetupError::ZeroValue {
        context: "samples",
    })?;

    for &point_count in POINT_COUNTS {
        let source = SyntheticSource::generate(&SyntheticConfig {
            point_count,
            dimensions: DIMENSIONS,
            seed: SEED,
        })?;
        let distances = Distances::new(&source, &execution)?;
        let tree = KdTreeBuilder::new(&distances, &execution)
            .leaf_size(DEFAULT_LEAF_SIZE)
            .build()?;
        let core = core_distances(&tree, &distances, samples, &execution)?;

        for &traversal in TRAVERSALS {
            let bench_params = MstBenchParams {
                point_count,
                traversal,
            };

            group.bench_with_input(
                BenchmarkId::from_parameter(&bench_params),
                &traversal,
                |b, &strategy| {
                    b.iter(|| {
                        if let Err(err) =
                            boruvka_mst(&tree, &distances, &core, strategy, &execution)
                        {
                            panic!("boruvka_mst failed during benchmark: {err}");
                        }
                    });
                },
            );
        }
    }

    group.finish();
    Ok(())
}

fn boruvka(c: &mut Criterion) {
    if let Err(err) = boruvka_impl(c) {
        panic!("boruvka_mst benchmark setup failed: {err}");
    }
}

criterion_group!(benches, boruvka);
criterion_main!(benches);
