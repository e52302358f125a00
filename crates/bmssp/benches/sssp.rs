use std::hint::black_box;
use std::time::Duration;

use bmssp::DirectedGraph;
use bmssp::bmssp;
use bmssp::dijkstra_binary_heap;
use bmssp::generator::GraphCase;
use bmssp::generator::generate_case;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::SamplingMode;
use criterion::criterion_group;
use criterion::criterion_main;

type SolverFn = fn(&DirectedGraph, usize) -> Vec<f64>;

const ALGORITHMS: [(&str, SolverFn); 2] = [
    ("bmssp_block", bmssp),
    ("dijkstra_binary", dijkstra_binary_heap),
];

const CASES: [GraphCase; 5] = [
    GraphCase::SparseRandom,
    GraphCase::DenseRandom,
    GraphCase::AlmostLine,
    GraphCase::GridRandom,
    GraphCase::ZeroHeavy,
];

const SIZES: [usize; 3] = [1_024, 8_192, 32_768];

fn apply_runtime(
    group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    size: usize,
) {
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(120));
    if size <= 8_192 {
        group.sampling_mode(SamplingMode::Auto);
        group.measurement_time(Duration::from_millis(220));
    } else {
        group.sampling_mode(SamplingMode::Flat);
        group.measurement_time(Duration::from_millis(360));
    }
}

fn bench_sssp(c: &mut Criterion) {
    for case in CASES {
        let mut group = c.benchmark_group(format!("sssp/{}", case.label()));

        for &size in &SIZES {
            apply_runtime(&mut group, size);
            let seed = 0x5EED_2026 ^ ((size as u64) << 7) ^ (case as u64);
            let input = generate_case(case, size, seed);

            for (algo_name, solver) in ALGORITHMS {
                group.bench_function(BenchmarkId::new(algo_name, size), |bencher| {
                    bencher.iter(|| {
                        let dist = solver(&input.graph, input.source);
                        black_box(dist);
                    });
                });
            }
        }

        group.finish();
    }
}

criterion_group!(benches, bench_sssp);
criterion_main!(benches);
