use crate::covariance::{add_to_diagonal, covariance_matrix};
use crate::errors::{GpError, Result};
use crate::kernels::{Kernel, KernelSpec};
use crate::parameters::{GpParams, GpValidParams};
use crate::sampling::{MultivariateNormal, SamplingMethod};

use linfa::{Float, ParamGuard};
use linfa_linalg::{cholesky::*, triangular::*};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1};
use ndarray_rand::rand::Rng;

use log::{debug, warn};
use std::fmt;
use std::time::Instant;

/// Mean vector and covariance matrix of the GP at a set of query points
#[derive(Clone, Debug, PartialEq)]
pub struct Posterior<F: Float> {
    /// Mean vector (m,)
    pub mean: Array1<F>,
    /// Covariance matrix (m, m)
    pub covariance: Array2<F>,
}

impl<F: Float> Posterior<F> {
    /// Variances at query points, slightly negative values due to
    /// machine precision are set to zero
    pub fn variance(&self) -> Array1<F> {
        self.covariance
            .diag()
            .mapv(|v| if v < F::zero() { F::zero() } else { v })
    }

    /// Standard deviations at query points
    pub fn std(&self) -> Array1<F> {
        self.variance().mapv(|v| v.sqrt())
    }

    /// Lower and upper bounds `mean -/+ z * std` of the confidence band
    pub fn confidence_band(&self, z: F) -> (Array1<F>, Array1<F>) {
        let half_width = self.std() * z;
        (&self.mean - &half_width, &self.mean + &half_width)
    }

    /// Draw `n_traj` sample paths (one per row) from this distribution
    pub fn sample<R: Rng + ?Sized>(
        &self,
        n_traj: usize,
        method: SamplingMethod<F>,
        rng: &mut R,
    ) -> Result<Array2<F>> {
        let mvn = MultivariateNormal::new(&self.mean, &self.covariance, method)?;
        Ok(mvn.sample(n_traj, rng))
    }
}

/// A Gaussian process with zero prior mean conditioned on observations.
///
/// Given a kernel `k`, training inputs `X` (n,) and outputs `Y` (n,), the regularized
/// training covariance is
///
/// `K_reg = K(X, X) + (noise_variance + jitter) * I`
///
/// and at query points `X*` (m,):
///
/// * posterior mean: `K(X*, X) . K_reg^-1 . Y`
/// * posterior covariance: `K(X*, X*) - K(X*, X) . K_reg^-1 . K(X, X*)`
///
/// `K_reg` is factorized once at fitting with a Cholesky decomposition and
/// the solves are done with triangular solves, `K_reg` is never inverted.
///
/// Without any training point the process is the prior: zero mean and
/// `K(X*, X*)` covariance.
///
/// # Example
///
/// ```no_run
/// use gpshow_gp::{kernels::SquaredExponential, GaussianProcess};
/// use ndarray::{array, Array1};
///
/// let xt = array![-4.1, -2.2, 0., 2.5, 4.1];
/// let yt = array![-2., 2.88, -2.96, 2.22, -3.5];
///
/// let gp = GaussianProcess::params(SquaredExponential::default())
///     .noise_variance(0.01)
///     .jitter(0.)
///     .fit(&xt, &yt)
///     .expect("GP fitted");
///
/// let xtest = Array1::linspace(-5., 5., 50);
/// let posterior = gp.posterior(&xtest).expect("GP posterior");
/// let (lower, upper) = posterior.confidence_band(1.96);
/// ```
#[derive(Clone, Debug)]
pub struct GaussianProcess<F: Float, K: Kernel<F>> {
    /// Training inputs
    xt: Array1<F>,
    /// Training outputs
    yt: Array1<F>,
    /// Lower triangular Cholesky factor of the regularized training covariance
    l_chol: Array2<F>,
    /// Solution of the linear system K_reg . alpha = Y
    alpha: Array1<F>,
    /// Log marginal likelihood of the training outputs
    log_likelihood: F,
    /// Parameters used to fit this model
    params: GpValidParams<F, K>,
}

impl<F: Float, K: Kernel<F>> fmt::Display for GaussianProcess<F, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(kernel={}, n_train={}, noise_variance={}, jitter={}, log_likelihood={})",
            self.params.kernel,
            self.xt.len(),
            self.params.noise_variance,
            self.params.jitter,
            self.log_likelihood,
        )
    }
}

impl<F: Float, K: Kernel<F>> GaussianProcess<F, K> {
    /// Gp parameters constructor
    pub fn params(kernel: K) -> GpParams<F, K> {
        GpParams::new(kernel)
    }

    /// Training inputs
    pub fn training_inputs(&self) -> &Array1<F> {
        &self.xt
    }

    /// Training outputs
    pub fn training_outputs(&self) -> &Array1<F> {
        &self.yt
    }

    /// Parameters used to fit this model
    pub fn gp_params(&self) -> &GpValidParams<F, K> {
        &self.params
    }

    /// Covariance kernel
    pub fn kernel(&self) -> &K {
        &self.params.kernel
    }

    /// Whether the process is conditioned on no data
    pub fn is_prior(&self) -> bool {
        self.xt.is_empty()
    }

    /// Log marginal likelihood `log p(Y | X)` of the training outputs (0 for the prior)
    pub fn log_marginal_likelihood(&self) -> F {
        self.log_likelihood
    }

    /// Predict mean values at the m given query points `x`.
    /// Returns the (m,) posterior mean vector.
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Array1<F>> {
        if self.is_prior() {
            return Ok(Array1::zeros(x.len()));
        }
        let k_star = covariance_matrix(x, &self.xt, &self.params.kernel)?;
        Ok(k_star.dot(&self.alpha))
    }

    /// Predict the (m, m) covariance matrix at the m given query points `x`.
    pub fn predict_cov(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Array2<F>> {
        let k_star_star = covariance_matrix(x, x, &self.params.kernel)?;
        if self.is_prior() {
            return Ok(k_star_star);
        }
        let k_star = covariance_matrix(x, &self.xt, &self.params.kernel)?;
        let v = self.solve_lower(&k_star)?;
        Ok(k_star_star - v.t().dot(&v))
    }

    /// Predict variances at the m given query points `x`.
    /// Returns the (m,) diagonal of the posterior covariance.
    pub fn predict_var(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Array1<F>> {
        self.params.kernel.check()?;
        let prior_var = x.mapv(|xi| self.params.kernel.value(xi, xi));
        let var = if self.is_prior() {
            prior_var
        } else {
            let k_star = covariance_matrix(x, &self.xt, &self.params.kernel)?;
            let v = self.solve_lower(&k_star)?;
            prior_var - v.mapv(|vi| vi * vi).sum_axis(Axis(0))
        };
        // Variance might be slightly negative depending on
        // machine precision: set to zero in that case
        Ok(var.mapv(|v| if v < F::zero() { F::zero() } else { v }))
    }

    /// Compute posterior mean and covariance at the m given query points `x` in one pass
    pub fn posterior(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Posterior<F>> {
        let k_star_star = covariance_matrix(x, x, &self.params.kernel)?;
        if self.is_prior() {
            return Ok(Posterior {
                mean: Array1::zeros(x.len()),
                covariance: k_star_star,
            });
        }
        let k_star = covariance_matrix(x, &self.xt, &self.params.kernel)?;
        let mean = k_star.dot(&self.alpha);
        let v = self.solve_lower(&k_star)?;
        Ok(Posterior {
            mean,
            covariance: k_star_star - v.t().dot(&v),
        })
    }

    /// Sample the gaussian process at query points `x` for `n_traj` trajectories.
    /// Returns a (n_traj, m) matrix, one sample path per row.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        n_traj: usize,
        method: SamplingMethod<F>,
        rng: &mut R,
    ) -> Result<Array2<F>> {
        self.posterior(x)?.sample(n_traj, method, rng)
    }

    /// Solve `L.V = K(X*, X)^T` returning V (n, m)
    fn solve_lower(&self, k_star: &Array2<F>) -> Result<Array2<F>> {
        if k_star.is_empty() {
            return Ok(Array2::zeros((self.xt.len(), k_star.nrows())));
        }
        let k_star_t = k_star.t().to_owned();
        Ok(self.l_chol.solve_triangular(&k_star_t, UPLO::Lower)?)
    }
}

impl<F: Float, K: Kernel<F>> GpValidParams<F, K> {
    /// Condition the zero mean GP prior on training inputs `xt` (n,) and outputs `yt` (n,).
    ///
    /// Fails when `xt` and `yt` lengths differ or when the regularized training
    /// covariance cannot be factorized (singular or ill-conditioned matrix), in that
    /// case a larger jitter may be used.
    pub fn fit(
        &self,
        xt: &ArrayBase<impl Data<Elem = F>, Ix1>,
        yt: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<GaussianProcess<F, K>> {
        if xt.len() != yt.len() {
            return Err(GpError::InvalidValueError(format!(
                "training inputs ({}) and outputs ({}) should have the same length",
                xt.len(),
                yt.len()
            )));
        }
        let n = xt.len();
        if n == 0 {
            return Ok(GaussianProcess {
                xt: Array1::zeros(0),
                yt: Array1::zeros(0),
                l_chol: Array2::zeros((0, 0)),
                alpha: Array1::zeros(0),
                log_likelihood: F::zero(),
                params: self.clone(),
            });
        }
        if has_duplicates(xt) {
            warn!("Duplicated training inputs, training covariance may be ill-conditioned");
        }

        let mut k = covariance_matrix(xt, xt, &self.kernel)?;
        add_to_diagonal(&mut k, self.diagonal_term());

        let now = Instant::now();
        let l_chol = k.cholesky()?;
        let y = yt.to_owned().insert_axis(Axis(1));
        let z = l_chol.solve_triangular(&y, UPLO::Lower)?;
        let alpha = l_chol
            .t()
            .solve_triangular(&z, UPLO::Upper)?
            .remove_axis(Axis(1));
        debug!(
            "Training covariance ({n}x{n}) factorized in {:?}ms",
            now.elapsed().as_millis()
        );

        let log_det_half = l_chol.diag().mapv(|v| v.ln()).sum();
        let log_likelihood = F::cast(-0.5) * yt.dot(&alpha)
            - log_det_half
            - F::cast(n as f64 * 0.5 * (2. * std::f64::consts::PI).ln());

        Ok(GaussianProcess {
            xt: xt.to_owned(),
            yt: yt.to_owned(),
            l_chol,
            alpha,
            log_likelihood,
            params: self.clone(),
        })
    }
}

impl<F: Float, K: Kernel<F>> GpParams<F, K> {
    /// Check parameters then condition the GP on training data (see [`GpValidParams::fit`])
    pub fn fit(
        &self,
        xt: &ArrayBase<impl Data<Elem = F>, Ix1>,
        yt: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<GaussianProcess<F, K>> {
        self.check_ref()?.fit(xt, yt)
    }

    /// Check parameters and return the unconditioned GP prior
    pub fn prior(&self) -> Result<GaussianProcess<F, K>> {
        self.check_ref()?
            .fit(&Array1::<F>::zeros(0), &Array1::<F>::zeros(0))
    }
}

/// Compute the posterior of the GP with given `kernel` at query points `x`,
/// conditioned on `(xt, yt)` observations with observation noise variance
/// `noise_variance` and regularization `jitter`.
pub fn posterior<F: Float>(
    kernel: KernelSpec<F>,
    xt: &ArrayBase<impl Data<Elem = F>, Ix1>,
    yt: &ArrayBase<impl Data<Elem = F>, Ix1>,
    x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    noise_variance: F,
    jitter: F,
) -> Result<Posterior<F>> {
    GpParams::new(kernel)
        .noise_variance(noise_variance)
        .jitter(jitter)
        .fit(xt, yt)?
        .posterior(x)
}

fn has_duplicates<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> bool {
    x.iter()
        .enumerate()
        .any(|(i, xi)| x.iter().skip(i + 1).any(|xj| xi == xj))
}
