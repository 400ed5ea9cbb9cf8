use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use knn_index::kdtree::{KdTree, KdTreeBuilder};
use knn_index::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DIM: usize = 8;

fn random_samples(n: usize, seed: u64) -> Vec<(Point<DIM>, u8)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let mut coords = [0.0f64; DIM];
            for c in coords.iter_mut() {
                *c = rng.gen_range(0.0..100.0);
            }
            (Point::new(coords), rng.gen_range(0..10u8))
        })
        .collect()
}

fn build_tree(samples: &[(Point<DIM>, u8)]) -> KdTree<DIM, u8> {
    let mut builder = KdTreeBuilder::with_capacity(samples.len());
    for (point, label) in samples {
        builder.add(*point, *label);
    }
    builder.finish()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let samples = random_samples(10_000, 42);
    let queries = random_samples(100, 7);

    c.bench_function("construction (10k points)", |b| {
        b.iter(|| build_tree(&samples))
    });

    let tree = build_tree(&samples);

    c.bench_function("knn_value k=1 (100 queries)", |b| {
        b.iter(|| {
            for (query, _) in &queries {
                black_box(tree.knn_value(query, 1));
            }
        })
    });

    c.bench_function("knn_value k=9 (100 queries)", |b| {
        b.iter(|| {
            for (query, _) in &queries {
                black_box(tree.knn_value(query, 9));
            }
        })
    });

    c.bench_function("contains (100 queries)", |b| {
        b.iter(|| {
            for (query, _) in &queries {
                black_box(tree.contains(query));
            }
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
