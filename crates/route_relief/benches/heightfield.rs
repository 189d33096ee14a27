mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use route_relief::heightfield::{rasterize_chains, CellRect, RelaxOptions, Relaxer};

const CHAIN_COUNTS: [usize; 4] = [1, 8, 32, 128];
const EXTENTS: [i64; 3] = [32, 64, 128];

fn rasterize_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("heightfield/rasterize");
    for &count in &CHAIN_COUNTS {
        let chains = common::random_chains(0xBEEF ^ count as u64, count, 64, 100.0);
        let segments: usize = chains.iter().map(|c| c.len().saturating_sub(1)).sum();
        group.throughput(common::elements_throughput(segments));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let field = rasterize_chains(&chains, 1.0).expect("rasterize");
                black_box(field.len());
            });
        });
    }
    group.finish();
}

fn relax_pass_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("heightfield/relax_pass");
    for &extent in &EXTENTS {
        let chains = common::random_chains(0x5EED, 16, 64, extent as f64);
        let mut field = rasterize_chains(&chains, 1.0).expect("rasterize");
        let rect = CellRect::new(0, 0, extent, extent).expect("valid rect");
        let relaxer = Relaxer::new(RelaxOptions::default().with_extent(rect));
        // Grow to the full extent first so every pass touches the same cells.
        for _ in 0..(2 * extent) {
            relaxer.pass(&mut field);
        }
        group.throughput(common::elements_throughput(field.len()));
        group.bench_with_input(BenchmarkId::from_parameter(extent), &extent, |b, _| {
            b.iter_batched(
                || field.clone(),
                |mut f| black_box(relaxer.pass(&mut f)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = rasterize_benches, relax_pass_benches
}
criterion_main!(benches);
