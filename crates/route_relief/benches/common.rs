use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use route_relief::chain::Chain;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Random walks inside `[0, extent]^2` with monotonically increasing z.
pub fn random_chains(seed: u64, count: usize, points: usize, extent: f64) -> Vec<Chain> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut unit = move || rng.next_u32() as f64 / u32::MAX as f64;
    (0..count)
        .map(|_| {
            let mut p = DVec3::new(unit() * extent, unit() * extent, 0.0);
            let mut pts = Vec::with_capacity(points);
            for _ in 0..points {
                pts.push(p);
                p.x = (p.x + (unit() - 0.5) * extent * 0.1).clamp(0.0, extent);
                p.y = (p.y + (unit() - 0.5) * extent * 0.1).clamp(0.0, extent);
                p.z += 1.0 + unit() * 30.0;
            }
            Chain::new(pts).expect("finite bench points")
        })
        .collect()
}
