//! End-to-end C-DBSCAN clustering benchmarks.
//!
//! Measures a full run (index build, local seeding, alpha merging) over
//! seeded blob data, with and without constraints, under both local-phase
//! schedules.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use cdbscan_benches::{
    error::BenchSetupError,
    params::ClusterBenchParams,
    source::{BlobConfig, BlobSet},
};
use cdbscan_core::{CdbscanBuilder, ExecutionStrategy};

/// Seed used for all synthetic data generation in this benchmark.
const SEED: u64 = 42;

/// Point dimensionality for all benchmark datasets.
const DIMENSIONS: usize = 4;

/// Number of blobs the points are dealt across.
const BLOBS: usize = 8;

/// Dataset sizes to benchmark.
const POINT_COUNTS: &[usize] = &[100, 500, 1_000];

/// Constraint pairs sampled per kind; zero runs unconstrained.
const CONSTRAINT_PAIRS: &[usize] = &[0, 16];

/// Local-phase schedules to compare.
const STRATEGIES: &[ExecutionStrategy] =
    &[ExecutionStrategy::Sequential, ExecutionStrategy::Parallel];

fn cdbscan_run_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    for &strategy in STRATEGIES {
        let mut group = c.benchmark_group(format!("cdbscan_{strategy:?}").to_lowercase());
        group.sample_size(20);

        let cdbscan = CdbscanBuilder::new()
            .with_epsilon(1.0)
            .with_min_points(4)
            .with_execution_strategy(strategy)
            .build()?;

        for &point_count in POINT_COUNTS {
            let blobs = BlobSet::generate(&BlobConfig {
                point_count,
                blobs: BLOBS,
                dimensions: DIMENSIONS,
                spread: 0.5,
                seed: SEED,
            })?;
            let source = blobs.source()?;

            for &constraint_pairs in CONSTRAINT_PAIRS {
                let constraints = blobs.sample_constraints(constraint_pairs, SEED);
                // Fail setup, not the measured loop, on a rejected configuration.
                cdbscan.run(&source, &constraints)?;

                let bench_params = ClusterBenchParams {
                    point_count,
                    constraint_pairs,
                };
                group.bench_with_input(
                    BenchmarkId::from_parameter(&bench_params),
                    &(&source, &constraints),
                    |b, &(source, constraints)| {
                        b.iter(|| {
                            let _result = cdbscan.run(source, constraints);
                        });
                    },
                );
            }
        }

        group.finish();
    }
    Ok(())
}

fn cdbscan_run(c: &mut Criterion) {
    if let Err(err) = cdbscan_run_impl(c) {
        panic!("cdbscan_run benchmark setup failed: {err}");
    }
}

criterion_group!(benches, cdbscan_run);
criterion_main!(benches);
