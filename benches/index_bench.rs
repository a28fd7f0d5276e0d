use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shotpick::sequence::{GroupingMethod, SequenceEngine};
use shotpick::shot::Shot;
use shotpick::vector::{HnswConfig, VectorIndex};

const DIM: usize = 128;

fn generate_vectors(count: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..dim).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect())
        .collect()
}

fn build_index(kind: &str, vectors: &[Vec<f32>]) -> VectorIndex {
    let mut index = match kind {
        "flat" => VectorIndex::flat(DIM),
        _ => VectorIndex::hnsw(DIM, HnswConfig::default().with_m(16)),
    }
    .unwrap();
    let ids: Vec<u64> = (0..vectors.len() as u64).collect();
    index.add(&ids, vectors, None).unwrap();
    index
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Index Insert");
    group.sample_size(10);

    for count in [1_000, 5_000] {
        let vectors = generate_vectors(count, DIM, 1);
        group.throughput(Throughput::Elements(count as u64));
        for kind in ["flat", "hnsw"] {
            group.bench_with_input(BenchmarkId::new(kind, count), &vectors, |b, vectors| {
                b.iter(|| build_index(kind, vectors))
            });
        }
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Index Search");
    let vectors = generate_vectors(10_000, DIM, 2);
    let query = generate_vectors(1, DIM, 3).remove(0);

    for kind in ["flat", "hnsw"] {
        let index = build_index(kind, &vectors);
        group.bench_function(BenchmarkId::new(kind, "top_10"), |b| {
            b.iter(|| index.search(black_box(&query), 10).unwrap())
        });
    }
    group.finish();
}

fn bench_hybrid_grouping(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(4);
    let locations = ["Square", "Court", "Parliament", "Studio"];
    let shots: Vec<Shot> = (0..400u64)
        .map(|id| {
            Shot::builder(id, "story")
                .capture_ts(id as f64 * 20.0)
                .location(locations[rng.random_range(0..locations.len())])
                .visual_embedding((0..32).map(|_| rng.random::<f32>()).collect())
                .build()
        })
        .collect();
    let engine = SequenceEngine::default();

    c.bench_function("group_hybrid_400", |b| {
        b.iter(|| engine.group_by_sequences(black_box(&shots), GroupingMethod::Hybrid))
    });
}

criterion_group!(benches, bench_insert, bench_search, bench_hybrid_grouping);
criterion_main!(benches);
