//! Criterion benchmarks for differential evolution.
//!
//! Uses synthetic problems (Sphere, Rosenbrock) to measure algorithm and
//! threading overhead independent of any domain.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_diffevo::de::{create_rng, DeConfig, DeHooks, DeRunner};

fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

fn rosenbrock(x: &[f64]) -> f64 {
    x.windows(2)
        .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
        .sum()
}

fn bench_de_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("de_sphere");
    group.sample_size(10);

    for (dim, pop, gen) in [(10usize, 50usize, 50usize), (50, 100, 30), (100, 100, 20)] {
        let config = DeConfig::new(vec![-5.0; dim], vec![5.0; dim])
            .with_population_size(pop)
            .with_max_generations(gen)
            .with_threads(1);
        group.bench_with_input(
            BenchmarkId::new(format!("d{}_p{}_g{}", dim, pop, gen), dim),
            &config,
            |b, c| {
                b.iter(|| {
                    let result =
                        DeRunner::run_with(&sphere, black_box(c), &mut create_rng(42), DeHooks::default());
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_de_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("de_rosenbrock_threads");
    group.sample_size(10);

    for &threads in &[1usize, 2, 4, 8] {
        let config = DeConfig::new(vec![-2.0; 8], vec![2.0; 8])
            .with_population_size(200)
            .with_max_generations(20)
            .with_threads(threads);
        group.bench_with_input(BenchmarkId::from_parameter(threads), &config, |b, c| {
            b.iter(|| {
                let result =
                    DeRunner::run_with(&rosenbrock, black_box(c), &mut create_rng(42), DeHooks::default());
                black_box(result)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_de_sphere, bench_de_threads);
criterion_main!(benches);
