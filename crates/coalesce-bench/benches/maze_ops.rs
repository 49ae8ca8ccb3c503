//! Criterion micro-benchmarks for board generation and dead-end scans.

use std::hint::black_box;

use coalesce_bench::{reference_maze, REFERENCE_SIZE, STRESS_SIZE};
use coalesce_maze::MazeGenerator;
use coalesce_space::DeadEndSet;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("maze_generate");
    for size in [REFERENCE_SIZE, STRESS_SIZE, 32] {
        let generator = MazeGenerator::new(size).unwrap();
        let mut seed = 0u64;
        group.bench_with_input(BenchmarkId::from_parameter(size), &generator, |b, g| {
            b.iter(|| {
                seed = seed.wrapping_add(1);
                black_box(g.generate_seeded(seed).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_dead_end_scan(c: &mut Criterion) {
    let maze = reference_maze(42).unwrap();
    c.bench_function("dead_end_scan_6x6", |b| {
        b.iter(|| black_box(DeadEndSet::from_grid(black_box(&maze.grid))));
    });
}

criterion_group!(benches, bench_generate, bench_dead_end_scan);
criterion_main!(benches);
