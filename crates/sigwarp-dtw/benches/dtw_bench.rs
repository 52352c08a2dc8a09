//! Criterion benchmarks for sigwarp-dtw: full alignment and sliding-window search.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use sigwarp_dtw::{CostMethod, Dtw, LookFor, WindowConfig};

fn make_sine(n: usize, offset: f64) -> Vec<f64> {
    (0..n).map(|i| (i as f64 * 0.1).sin() + offset).collect()
}

fn bench_alignment_cost(c: &mut Criterion) {
    let mut group = c.benchmark_group("alignment_cost");

    for &len in &[64usize, 256, 1024] {
        let x = make_sine(len, 0.0);
        let y = make_sine(len, 0.5);
        for method in CostMethod::ALL {
            let id = BenchmarkId::new(format!("len{len}"), method.as_str());
            group.bench_with_input(id, &(&x, &y), |bencher, (x, y)| {
                bencher.iter(|| Dtw::new().alignment_cost(x, y, method).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_window_search(c: &mut Criterion) {
    let x = make_sine(4096, 0.0);
    let y = make_sine(4096, 0.3);
    let config = WindowConfig::new(64, 16).unwrap();
    let dtw = Dtw::new();

    c.bench_function("window_search_4096_w64_s16_min", |b| {
        b.iter(|| {
            dtw.find_alignment_cost(&x, &y, &config, CostMethod::Distance, LookFor::Min)
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_alignment_cost, bench_window_search);
criterion_main!(benches);
