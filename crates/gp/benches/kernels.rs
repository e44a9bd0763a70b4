use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gpshow_gp::covariance::{covariance_matrices, covariance_matrix, par_covariance_matrix};
use gpshow_gp::kernels::{KernelConfig, KernelKind, KernelSpec};
use ndarray::Array1;

fn bench_covariance_matrix(c: &mut Criterion) {
    let config = KernelConfig::default();
    let mut group = c.benchmark_group("covariance_matrix");

    for size in [10, 50, 200].iter() {
        let x = Array1::linspace(-5., 5., *size);
        for kind in KernelKind::ALL {
            let kernel = KernelSpec::from_config(kind, &config);
            group.bench_with_input(BenchmarkId::new(kind.as_str(), size), size, |b, _| {
                b.iter(|| covariance_matrix(&x, &x, &kernel));
            });
        }
    }
    group.finish();
}

fn bench_par_covariance_matrix(c: &mut Criterion) {
    let kernel = KernelSpec::<f64>::default();
    let mut group = c.benchmark_group("par_covariance_matrix");

    for size in [50, 200, 1000].iter() {
        let x = Array1::linspace(-5., 5., *size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| par_covariance_matrix(&x, &x, &kernel));
        });
    }
    group.finish();
}

fn bench_all_kernels(c: &mut Criterion) {
    let config = KernelConfig::default();
    let kernels = KernelKind::ALL
        .iter()
        .map(|kind| KernelSpec::from_config(*kind, &config))
        .collect::<Vec<_>>();
    let x = Array1::linspace(-5., 5., 50);

    c.bench_function("covariance_matrices 6 kernels", |b| {
        b.iter(|| covariance_matrices(&x, &x, &kernels))
    });
}

criterion_group!(
    benches,
    bench_covariance_matrix,
    bench_par_covariance_matrix,
    bench_all_kernels
);
criterion_main!(benches);
