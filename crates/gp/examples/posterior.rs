use gpshow_gp::kernels::{KernelConfig, KernelKind, KernelSpec};
use gpshow_gp::GaussianProcess;
use ndarray::{array, concatenate, Array, Axis};

fn main() {
    let xtrain = array![-4.1, -2.2, 0., 2.5, 4.1];
    let ytrain = array![-2., 2.88, -2.96, 2.22, -3.5];
    let xtest = Array::linspace(-5., 5., 11);

    for kind in KernelKind::ALL {
        let kernel = KernelSpec::from_config(kind, &KernelConfig::default());
        let gp = GaussianProcess::params(kernel)
            .noise_variance(0.01)
            .jitter(0.)
            .fit(&xtrain, &ytrain)
            .expect("GP fitting");
        println!("{gp}");

        let posterior = gp.posterior(&xtest).expect("GP posterior");
        println!("Posterior (x, mean(x), std(x))");
        println!(
            "{}",
            concatenate![
                Axis(1),
                xtest.view().insert_axis(Axis(1)),
                posterior.mean.view().insert_axis(Axis(1)),
                posterior.std().insert_axis(Axis(1))
            ]
        );
    }
}
