//! Showcase configuration.
use crate::errors::{Result, ShowError};
use crate::scenario::Scenario;
use gpshow_gp::kernels::{Kernel, KernelConfig, KernelKind, KernelSpec};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default number of query points
pub const DEFAULT_N_QUERY: usize = 50;
/// Default number of sample paths drawn per panel
pub const DEFAULT_N_SAMPLES: usize = 3;
/// Default random seed
pub const DEFAULT_SEED: u64 = 42;

/// Showcase configuration: which kernels to run, their hyperparameters,
/// the observations and the query grid.
///
/// Default values reproduce the reference scenario: five observations,
/// 50 query points in `[-5, 5]`, observation noise variance 0.01.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    /// Kernels to run, in output order
    pub(crate) kernels: Vec<KernelKind>,
    /// Scenarios run for each kernel, in output order
    pub(crate) scenarios: Vec<Scenario>,
    /// Kernel hyperparameters shared by all kernels
    pub(crate) kernel_config: KernelConfig<f64>,
    /// Training inputs
    pub(crate) xtrain: Vec<f64>,
    /// Training outputs
    pub(crate) ytrain: Vec<f64>,
    /// Query interval `(lower, upper)`
    pub(crate) query_bounds: (f64, f64),
    /// Number of evenly spaced query points within `query_bounds`
    pub(crate) n_query: usize,
    /// Observation noise variance of the noisy scenario
    pub(crate) noise_variance: f64,
    /// Jitter of the noiseless posterior scenario
    pub(crate) jitter: f64,
    /// Jitter added on top of the noise variance in the noisy scenario
    pub(crate) noisy_jitter: f64,
    /// Number of sample paths per panel
    pub(crate) n_samples: usize,
    /// Negative eigenvalues of magnitude below this are treated as zero when sampling
    pub(crate) eig_tolerance: f64,
    /// Half-width of the confidence band in standard deviations
    pub(crate) confidence_z: f64,
    /// Random seed
    pub(crate) seed: u64,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        ShowcaseConfig {
            kernels: KernelKind::ALL.to_vec(),
            scenarios: Scenario::ALL.to_vec(),
            kernel_config: KernelConfig::default(),
            xtrain: vec![-4.1, -2.2, 0., 2.5, 4.1],
            ytrain: vec![-2., 2.88, -2.96, 2.22, -3.5],
            query_bounds: (-5., 5.),
            n_query: DEFAULT_N_QUERY,
            noise_variance: 0.01,
            jitter: 0.01,
            noisy_jitter: 0.,
            n_samples: DEFAULT_N_SAMPLES,
            eig_tolerance: 1e-6,
            confidence_z: 1.96,
            seed: DEFAULT_SEED,
        }
    }
}

impl ShowcaseConfig {
    /// Load configuration from a JSON file, missing fields take their default value
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Set kernels to run
    pub fn kernels(mut self, kernels: &[KernelKind]) -> Self {
        self.kernels = kernels.to_vec();
        self
    }

    /// Set scenarios to run
    pub fn scenarios(mut self, scenarios: &[Scenario]) -> Self {
        self.scenarios = scenarios.to_vec();
        self
    }

    /// Set kernel hyperparameters
    pub fn kernel_config(mut self, kernel_config: KernelConfig<f64>) -> Self {
        self.kernel_config = kernel_config;
        self
    }

    /// Set observations
    pub fn training_data(mut self, xtrain: &[f64], ytrain: &[f64]) -> Self {
        self.xtrain = xtrain.to_vec();
        self.ytrain = ytrain.to_vec();
        self
    }

    /// Set query grid
    pub fn query(mut self, lower: f64, upper: f64, n_query: usize) -> Self {
        self.query_bounds = (lower, upper);
        self.n_query = n_query;
        self
    }

    /// Set observation noise variance of the noisy scenario
    pub fn noise_variance(mut self, noise_variance: f64) -> Self {
        self.noise_variance = noise_variance;
        self
    }

    /// Set jitter of the noiseless scenario
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set number of sample paths per panel
    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Set random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Training inputs
    pub fn xtrain(&self) -> Array1<f64> {
        Array1::from_vec(self.xtrain.clone())
    }

    /// Training outputs
    pub fn ytrain(&self) -> Array1<f64> {
        Array1::from_vec(self.ytrain.clone())
    }

    /// Evenly spaced query points
    pub fn xquery(&self) -> Array1<f64> {
        Array1::linspace(self.query_bounds.0, self.query_bounds.1, self.n_query)
    }

    /// Kernels to run built from their identifiers and the shared hyperparameters
    pub fn kernel_specs(&self) -> Vec<KernelSpec<f64>> {
        self.kernels
            .iter()
            .map(|kind| KernelSpec::from_config(*kind, &self.kernel_config))
            .collect()
    }

    /// Random seed
    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    /// Check configuration consistency
    pub fn check(&self) -> Result<()> {
        if self.kernels.is_empty() {
            return Err(ShowError::InvalidValueError(
                "at least one kernel should be given".to_string(),
            ));
        }
        if self.scenarios.is_empty() {
            return Err(ShowError::InvalidValueError(
                "at least one scenario should be given".to_string(),
            ));
        }
        for kernel in self.kernel_specs() {
            kernel.check()?;
        }
        if self.xtrain.len() != self.ytrain.len() {
            return Err(ShowError::InvalidValueError(format!(
                "xtrain ({}) and ytrain ({}) should have the same length",
                self.xtrain.len(),
                self.ytrain.len()
            )));
        }
        let (lower, upper) = self.query_bounds;
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(ShowError::InvalidValueError(format!(
                "query bounds should be finite with lower < upper, got ({lower}, {upper})"
            )));
        }
        if self.n_query == 0 {
            return Err(ShowError::InvalidValueError(
                "`n_query` should be strictly positive".to_string(),
            ));
        }
        for (name, value) in [
            ("noise_variance", self.noise_variance),
            ("jitter", self.jitter),
            ("noisy_jitter", self.noisy_jitter),
            ("eig_tolerance", self.eig_tolerance),
            ("confidence_z", self.confidence_z),
        ] {
            if !(value.is_finite() && value >= 0.) {
                return Err(ShowError::InvalidValueError(format!(
                    "`{name}` should be non negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}
