//! Prior, posterior and noisy posterior panels for each configured kernel.
use crate::config::ShowcaseConfig;
use crate::errors::Result;

use gpshow_gp::kernels::{Kernel, KernelKind, KernelSpec};
use gpshow_gp::{GpParams, Posterior, SamplingMethod};

use log::{debug, info};
use ndarray::{Array1, Array2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Conditioning situation displayed in a panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// No observation
    Prior,
    /// Exact observations, only the jitter regularizes the training covariance
    Posterior,
    /// Observations corrupted by gaussian noise
    NoisyPosterior,
}

impl Scenario {
    /// All scenarios in display order
    pub const ALL: [Scenario; 3] = [
        Scenario::Prior,
        Scenario::Posterior,
        Scenario::NoisyPosterior,
    ];

    /// Stable identifier of the scenario
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Prior => "prior",
            Scenario::Posterior => "posterior",
            Scenario::NoisyPosterior => "noisy_posterior",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Results of one (kernel, scenario) pair, ready to be plotted
#[derive(Clone, Debug)]
pub struct Panel {
    /// Kernel used
    pub kernel: KernelKind,
    /// Conditioning situation
    pub scenario: Scenario,
    /// Observations the GP is conditioned on, empty for the prior
    pub xtrain: Array1<f64>,
    /// Observed outputs, empty for the prior
    pub ytrain: Array1<f64>,
    /// Query points (m,)
    pub x: Array1<f64>,
    /// Posterior mean and covariance at query points
    pub posterior: Posterior<f64>,
    /// Lower bound of the confidence band
    pub lower: Array1<f64>,
    /// Upper bound of the confidence band
    pub upper: Array1<f64>,
    /// Sample paths (n_samples, m)
    pub samples: Array2<f64>,
    /// Log marginal likelihood of the observations (0 for the prior)
    pub log_likelihood: f64,
}

impl Panel {
    /// Series identifier prefix `<kernel>/<scenario>`
    pub fn name(&self) -> String {
        format!("{}/{}", self.kernel, self.scenario)
    }
}

/// Condition a GP with `kernel` following `scenario` and draw sample paths
/// at the configured query points.
pub fn run_panel<R: Rng + ?Sized>(
    config: &ShowcaseConfig,
    kernel: &KernelSpec<f64>,
    scenario: Scenario,
    rng: &mut R,
) -> Result<Panel> {
    let params = GpParams::new(kernel.clone());
    let (xtrain, ytrain) = match scenario {
        Scenario::Prior => (Array1::zeros(0), Array1::zeros(0)),
        Scenario::Posterior | Scenario::NoisyPosterior => (config.xtrain(), config.ytrain()),
    };
    let params = match scenario {
        Scenario::Prior | Scenario::Posterior => params.noise_variance(0.).jitter(config.jitter),
        Scenario::NoisyPosterior => params
            .noise_variance(config.noise_variance)
            .jitter(config.noisy_jitter),
    };
    let gp = params.fit(&xtrain, &ytrain)?;
    debug!("{} {}: {}", kernel.kind(), scenario, gp);

    let x = config.xquery();
    let posterior = gp.posterior(&x)?;
    let (lower, upper) = posterior.confidence_band(config.confidence_z);
    let method = SamplingMethod::EigenValues {
        tolerance: config.eig_tolerance,
    };
    let samples = posterior.sample(config.n_samples, method, rng)?;

    Ok(Panel {
        kernel: kernel.kind(),
        scenario,
        xtrain,
        ytrain,
        x,
        posterior,
        lower,
        upper,
        samples,
        log_likelihood: gp.log_marginal_likelihood(),
    })
}

/// Run every configured scenario for every configured kernel.
///
/// Kernels are processed in parallel, each one with its own random generator
/// derived from the configured seed and the kernel position so that results
/// do not depend on scheduling. Panels are returned kernel by kernel in the
/// configured order.
pub fn run_showcase(config: &ShowcaseConfig) -> Result<Vec<Panel>> {
    config.check()?;
    let now = Instant::now();
    let panels = config
        .kernel_specs()
        .par_iter()
        .enumerate()
        .map(|(i, kernel)| {
            let mut rng = Xoshiro256Plus::seed_from_u64(config.seed);
            for _ in 0..i {
                rng.jump();
            }
            info!("Running {} scenarios with {}", config.scenarios.len(), kernel);
            config
                .scenarios
                .iter()
                .map(|scenario| run_panel(config, kernel, *scenario, &mut rng))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    info!(
        "Showcase of {} kernels done in {:?}ms",
        panels.len(),
        now.elapsed().as_millis()
    );
    Ok(panels.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use gpshow_gp::kernels::KernelConfig;

    #[test]
    fn test_run_panel_dimensions() {
        let config = ShowcaseConfig::default().n_samples(4);
        let kernel = KernelSpec::from_config(KernelKind::Periodic, &Default::default());
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let panel = run_panel(&config, &kernel, Scenario::Posterior, &mut rng).unwrap();
        assert_eq!(panel.x.len(), 50);
        assert_eq!(panel.posterior.mean.len(), 50);
        assert_eq!(panel.posterior.covariance.dim(), (50, 50));
        assert_eq!(panel.samples.dim(), (4, 50));
        assert_eq!(panel.xtrain.len(), 5);
        assert_eq!(panel.name(), "periodic/posterior");
    }

    #[test]
    fn test_prior_panel() {
        let config = ShowcaseConfig::default();
        let kernel = KernelSpec::from_config(KernelKind::SquaredExponential, &Default::default());
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let panel = run_panel(&config, &kernel, Scenario::Prior, &mut rng).unwrap();
        assert!(panel.xtrain.is_empty());
        assert_eq!(panel.posterior.mean, Array1::<f64>::zeros(50));
        assert_abs_diff_eq!(panel.posterior.variance(), Array1::from_elem(50, 2.));
        assert_eq!(panel.log_likelihood, 0.);
    }

    #[test]
    fn test_confidence_band_contains_mean() {
        let config = ShowcaseConfig::default();
        let kernel = KernelSpec::from_config(KernelKind::RationalQuadratic, &Default::default());
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let panel = run_panel(&config, &kernel, Scenario::NoisyPosterior, &mut rng).unwrap();
        for ((lo, m), up) in panel
            .lower
            .iter()
            .zip(panel.posterior.mean.iter())
            .zip(panel.upper.iter())
        {
            assert!(lo <= m && m <= up);
        }
    }

    #[test]
    fn test_scenario_identifiers() {
        assert_eq!(Scenario::NoisyPosterior.to_string(), "noisy_posterior");
        let json = serde_json::to_string(&Scenario::ALL).unwrap();
        assert_eq!(json, r#"["prior","posterior","noisy_posterior"]"#);
    }

    #[test]
    fn test_default_showcase() {
        let config = ShowcaseConfig::default();
        let panels = run_showcase(&config).unwrap();
        assert_eq!(panels.len(), 6 * 3);

        let expected: Vec<(KernelKind, Scenario)> = KernelKind::ALL
            .iter()
            .flat_map(|k| Scenario::ALL.iter().map(move |s| (*k, *s)))
            .collect();
        let got: Vec<(KernelKind, Scenario)> =
            panels.iter().map(|p| (p.kernel, p.scenario)).collect();
        assert_eq!(got, expected);

        for panel in panels.iter() {
            assert_eq!(panel.posterior.mean.len(), 50);
            assert_eq!(panel.posterior.covariance.dim(), (50, 50));
            assert_eq!(panel.samples.dim(), (3, 50));
            assert!(panel.samples.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_squared_exp_noisy_posterior() {
        let config = ShowcaseConfig::default()
            .kernels(&[KernelKind::SquaredExponential])
            .scenarios(&[Scenario::NoisyPosterior]);
        let panels = run_showcase(&config).unwrap();
        let panel = &panels[0];

        // query points closest to the observation (0, -2.96) and far from all observations
        let i0 = 24;
        assert_abs_diff_eq!(panel.x[i0], -5. / 49., epsilon = 1e-12);
        let variance = panel.posterior.variance();
        assert!(variance[i0] < variance[49]);
        assert_abs_diff_eq!(panel.posterior.mean[i0], -2.8830593347453237, epsilon = 1e-8);
        assert_abs_diff_eq!(variance[i0], 0.029307529252814657, epsilon = 1e-8);
        assert_abs_diff_eq!(variance[49], 1.072033945941886, epsilon = 1e-8);
        assert_abs_diff_eq!(panel.log_likelihood, -18.597951441597026, epsilon = 1e-8);
    }

    #[test]
    fn test_noise_increases_uncertainty() {
        let config = ShowcaseConfig::default().jitter(1e-6);
        let panels = run_showcase(&config).unwrap();
        for pair in panels.chunks(3) {
            let (noiseless, noisy) = (&pair[1], &pair[2]);
            assert_eq!(noiseless.scenario, Scenario::Posterior);
            assert_eq!(noisy.scenario, Scenario::NoisyPosterior);
            let var = noiseless.posterior.variance();
            let noisy_var = noisy.posterior.variance();
            for (v, nv) in var.iter().zip(noisy_var.iter()) {
                assert!(*nv >= *v - 1e-6, "{}: {} < {}", noisy.name(), nv, v);
            }
        }
    }

    #[test]
    fn test_showcase_reproducible() {
        let config = ShowcaseConfig::default().seed(7);
        let first = run_showcase(&config).unwrap();
        let second = run_showcase(&config).unwrap();
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.samples, b.samples);
            assert_eq!(a.posterior, b.posterior);
        }

        let other = run_showcase(&config.clone().seed(8)).unwrap();
        assert_eq!(first[1].posterior, other[1].posterior);
        assert_ne!(first[1].samples, other[1].samples);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ShowcaseConfig::default().kernel_config(KernelConfig {
            length_scale: -1.,
            ..KernelConfig::default()
        });
        assert!(run_showcase(&config).is_err());
    }
}
