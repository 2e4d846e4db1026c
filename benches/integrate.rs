//! # Integration Benchmark
//!
//! One fall-and-wrap step over the reference population, plus a full CPU
//! frame (signal read, blend, integrate).
//!
//! Run with: `cargo bench --bench integrate`

use amber_rain::particles::{Bounds, ParticleBuffer};
use amber_rain::physics;
use amber_rain::{ControlSignal, RainConfig, RainState};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_integrate(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut buffer = ParticleBuffer::new(20_000, Bounds::default(), &mut rng);

    c.bench_function("integrate 20k", |b| {
        b.iter(|| physics::integrate(black_box(&mut buffer), black_box(-1.0)))
    });
}

fn bench_frame(c: &mut Criterion) {
    let config = RainConfig {
        seed: Some(1),
        ..RainConfig::default()
    };
    let signal = ControlSignal::new();
    let mut rain = RainState::new(&config, signal.clone());
    let mut frame = 0u32;

    c.bench_function("advance 20k", |b| {
        b.iter(|| {
            frame = frame.wrapping_add(1);
            signal.report_source_count((frame / 120) % 3);
            black_box(rain.advance(frame as f32 / 60.0))
        })
    });
}

criterion_group!(benches, bench_integrate, bench_frame);
criterion_main!(benches);
