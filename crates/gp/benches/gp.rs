use criterion::{criterion_group, criterion_main, Criterion};
use gpshow_gp::kernels::SquaredExponential;
use gpshow_gp::{GaussianProcess, SamplingMethod};
use ndarray::Array1;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn criterion_gp(c: &mut Criterion) {
    let nts = [10, 100, 400];

    let mut group = c.benchmark_group("gp");
    group.sample_size(20);
    for nt in nts {
        let xt = Array1::linspace(-5., 5., nt);
        let yt = xt.mapv(|v: f64| v * v.sin());
        let xtest = Array1::linspace(-5., 5., 50);

        group.bench_function(format!("gp fit+posterior {nt}"), |b| {
            b.iter(|| {
                std::hint::black_box(
                    GaussianProcess::params(SquaredExponential::default())
                        .noise_variance(0.01)
                        .fit(&xt, &yt)
                        .expect("GP fit error")
                        .posterior(&xtest)
                        .expect("GP posterior error"),
                );
            });
        });
    }
    group.finish();

    let xt = Array1::linspace(-5., 5., 10);
    let yt = xt.mapv(|v: f64| v * v.sin());
    let xtest = Array1::linspace(-5., 5., 50);
    let gp = GaussianProcess::params(SquaredExponential::default())
        .noise_variance(0.01)
        .fit(&xt, &yt)
        .expect("GP fit error");
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    c.bench_function("gp sample 100 paths", |b| {
        b.iter(|| {
            std::hint::black_box(
                gp.sample(
                    &xtest,
                    100,
                    SamplingMethod::EigenValues { tolerance: 1e-8 },
                    &mut rng,
                )
                .expect("GP sampling error"),
            )
        })
    });
}

criterion_group!(benches, criterion_gp);
criterion_main!(benches);
