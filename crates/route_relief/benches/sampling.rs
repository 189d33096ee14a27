mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use route_relief::grid::{CoordinateGrid, LatLng};
use route_relief::sampling::FarthestPointSampler;

const GRID_STEPS: [u32; 4] = [8, 16, 32, 64];

fn grid(steps: u32) -> CoordinateGrid {
    CoordinateGrid::new(LatLng::new(38.2, -85.6), LatLng::new(38.3, -85.5), [steps, steps])
        .expect("valid bench grid")
}

fn seeded(steps: u32) -> FarthestPointSampler {
    let grid = grid(steps);
    let step = grid.step_size().lat.max(grid.step_size().lng);
    FarthestPointSampler::seeded(grid, step, LatLng::new(38.25, -85.55))
}

fn sampling_step_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/first_step");
    for &steps in &GRID_STEPS {
        let sampler = seeded(steps);
        group.throughput(common::elements_throughput(sampler.grid().cell_count()));
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, _| {
            b.iter_batched(
                || sampler.clone(),
                |mut s| black_box(s.step()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn sampling_coverage_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/full_coverage");
    for &steps in &GRID_STEPS[..3] {
        let sampler = seeded(steps);
        group.throughput(common::elements_throughput(sampler.grid().cell_count()));
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, _| {
            b.iter_batched(
                || sampler.clone(),
                |mut s| {
                    let mut queries = 0usize;
                    while let Some(candidate) = s.step() {
                        s.visit_cell(candidate.cell);
                        queries += 1;
                    }
                    black_box(queries)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn sampling_fold_benches(c: &mut Criterion) {
    let chains = common::random_chains(0xF01D, 32, 256, 0.1);
    let shifted: Vec<_> = chains
        .iter()
        .map(|chain| {
            chain
                .try_map(|p| Ok(p + glam::DVec3::new(-85.6, 38.2, 0.0)))
                .expect("finite")
        })
        .collect();
    let points: usize = shifted.iter().map(|c| c.len()).sum();

    let mut group = c.benchmark_group("sampling/fold_chain");
    group.throughput(common::elements_throughput(points));
    group.bench_function("32x256", |b| {
        b.iter_batched(
            || seeded(64),
            |mut s| {
                let added: usize = shifted.iter().map(|chain| s.fold_chain(chain)).sum();
                black_box(added)
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = sampling_step_benches, sampling_coverage_benches, sampling_fold_benches
}
criterion_main!(benches);
