use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use epinet::{Engine, Params};

static SEED: u64 = 123;
static STEPS: u64 = 100;

fn default_world() -> Engine {
    Engine::new(Params::default(), SEED)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("build default world", |bencher| {
        bencher.iter_with_large_drop(default_world);
    });

    c.bench_function("100 steps, default world", |bencher| {
        bencher.iter_batched(
            default_world,
            |mut engine| {
                engine.run_steps(STEPS);
                black_box(engine.counts())
            },
            BatchSize::LargeInput,
        );
    });

    let crowded = Params {
        pop_size: 3000,
        ..Params::default()
    };
    c.bench_function("single step, 3000 people", |bencher| {
        let mut engine = Engine::new(crowded, SEED);
        bencher.iter(|| engine.step());
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
