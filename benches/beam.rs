//! Benchmarks for beam search over a proximity graph.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use landmark::graph::{ApproxGraph, BeamParams, BeamSearchIndex};
use landmark::{DistanceMetric, MetricDataset, MetricIndex, VectorDataset};
use rand::prelude::*;

// === Synthetic Data Generation ===

fn random_dataset(n: usize, dim: usize, seed: u64) -> VectorDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let flat: Vec<f32> = (0..n * dim).map(|_| rng.gen::<f32>()).collect();
    VectorDataset::new(dim, DistanceMetric::L2, flat).expect("valid dataset")
}

/// Exact k-NN graph; quadratic, built once per benchmark.
fn knn_graph(data: &VectorDataset, degree: usize) -> ApproxGraph {
    let n = data.len() as u32;
    let adjacency: Vec<Vec<u32>> = (0..n)
        .map(|v| {
            let mut all: Vec<(u32, f32)> = (0..n)
                .filter(|&u| u != v)
                .map(|u| (u, data.distance(data.get(v), data.get(u))))
                .collect();
            all.sort_by(|a, b| a.1.total_cmp(&b.1));
            all.into_iter().take(degree).map(|(u, _)| u).collect()
        })
        .collect();
    ApproxGraph::new(&adjacency).expect("graph")
}

// === Benchmarks ===

fn bench_beam_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("beam_search");

    let dim = 16;
    let n_queries = 100;
    let data = random_dataset(3000, dim, 42);
    let graph = knn_graph(&data, 16);
    let queries: Vec<Vec<f32>> = {
        let mut rng = StdRng::seed_from_u64(123);
        (0..n_queries)
            .map(|_| (0..dim).map(|_| rng.gen::<f32>()).collect())
            .collect()
    };

    for beam_size in [8, 32, 128].iter() {
        for parallel in [false, true] {
            let params = BeamParams {
                beam_size: *beam_size,
                sample_size: 256,
                parallel_expansion: parallel,
                ..BeamParams::default()
            };
            let index =
                BeamSearchIndex::new(data.clone(), graph.clone(), params).expect("index");
            let label = if parallel { "parallel" } else { "sequential" };

            group.throughput(Throughput::Elements(n_queries as u64));
            group.bench_with_input(BenchmarkId::new(label, beam_size), beam_size, |bench, _| {
                bench.iter(|| {
                    queries
                        .iter()
                        .map(|q| index.search_knn(black_box(q), 10))
                        .collect::<Vec<_>>()
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_beam_search);
criterion_main!(benches);
