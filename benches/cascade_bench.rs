//! Benchmarks for the per-sample cascade hot path and for filter design
//!
//! Run with: cargo bench --bench cascade_bench

use cascade_iir::{
    CascadeFilterEngine, CoefficientProvider, Cutoff, Design, DesignRequest, FilterParams,
    FilterType, ZpkDesigner,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const BLOCK: usize = 512;

fn test_signal() -> Vec<f64> {
    (0..BLOCK)
        .map(|n| (n as f64 * 0.05).sin() + 0.25 * (n as f64 * 0.9).sin())
        .collect()
}

/// Benchmark per-sample filtering for increasing orders
fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    group.throughput(Throughput::Elements(BLOCK as u64));
    let input = test_signal();

    for order in [2, 4, 8, 16] {
        let mut engine = CascadeFilterEngine::new(&FilterParams::new(order, 0.2, "lowpass"));
        group.bench_with_input(BenchmarkId::new("lowpass", order), &input, |b, input| {
            b.iter(|| {
                let mut acc = 0.0;
                for &x in input {
                    acc += engine.filter(black_box(x));
                }
                black_box(acc)
            })
        });
    }

    // Disabled engines should cost nothing beyond the branch
    let mut passthrough = CascadeFilterEngine::new(&FilterParams::new(4, 0.2, "lowpass").design("none"));
    group.bench_with_input(BenchmarkId::new("passthrough", 0), &input, |b, input| {
        b.iter(|| {
            let mut acc = 0.0;
            for &x in input {
                acc += passthrough.filter(black_box(x));
            }
            black_box(acc)
        })
    });

    group.finish();
}

/// Benchmark block processing against the per-sample loop
fn bench_process_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_block");
    group.throughput(Throughput::Elements(BLOCK as u64));
    let input = test_signal();
    let mut output = vec![0.0; BLOCK];

    let mut engine = CascadeFilterEngine::new(
        &FilterParams::new(3, [45.0, 55.0], "bandstop")
            .design("cheby1")
            .ripple_db(0.01)
            .sample_rate_hz(1000.0),
    );
    group.bench_function("mains_notch", |b| {
        b.iter(|| {
            engine.process_block(black_box(&input), &mut output);
            black_box(output[BLOCK - 1])
        })
    });

    group.finish();
}

/// Benchmark coefficient design (construction cost, off the hot path)
fn bench_design(c: &mut Criterion) {
    let mut group = c.benchmark_group("design");

    for (name, design) in [
        ("butter", Design::Butterworth),
        ("cheby1", Design::Chebyshev1 { ripple_db: 0.5 }),
        ("cheby2", Design::Chebyshev2 { attenuation_db: 60.0 }),
    ] {
        let request = DesignRequest {
            order: 8,
            cutoff: Cutoff::Band([0.1, 0.3]),
            filter_type: FilterType::Bandstop,
            design,
        };
        group.bench_function(name, |b| b.iter(|| ZpkDesigner.design(black_box(&request))));
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_process_block, bench_design);
criterion_main!(benches);
