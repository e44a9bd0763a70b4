use crate::errors::{GpError, Result};
use crate::kernels::{Kernel, KernelSpec};
use linfa::{Float, ParamGuard};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A set of validated GP parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, K: Serialize",
        deserialize = "F: Deserialize<'de>, K: Deserialize<'de>"
    ))
)]
pub struct GpValidParams<F: Float, K: Kernel<F>> {
    /// Covariance kernel k(x, x')
    pub(crate) kernel: K,
    /// Observation noise variance added to the training covariance diagonal
    pub(crate) noise_variance: F,
    /// Regularization added to the training covariance diagonal on top of the noise
    pub(crate) jitter: F,
}

impl<F: Float, K: Kernel<F> + Default> Default for GpValidParams<F, K> {
    fn default() -> GpValidParams<F, K> {
        GpValidParams {
            kernel: K::default(),
            noise_variance: F::zero(),
            jitter: F::cast(100.0) * F::epsilon(),
        }
    }
}

impl<F: Float, K: Kernel<F>> GpValidParams<F, K> {
    /// Get covariance kernel k(x, x')
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Get observation noise variance
    pub fn noise_variance(&self) -> F {
        self.noise_variance
    }

    /// Get regularization jitter
    pub fn jitter(&self) -> F {
        self.jitter
    }

    /// Total value added to the diagonal of the training covariance matrix
    pub fn diagonal_term(&self) -> F {
        self.noise_variance + self.jitter
    }
}

#[derive(Clone, Debug)]
/// The set of parameters that can be specified for the execution of
/// the [GP posterior engine](crate::GaussianProcess).
pub struct GpParams<F: Float, K: Kernel<F>>(GpValidParams<F, K>);

impl<F: Float, K: Kernel<F>> GpParams<F, K> {
    /// A constructor for GP parameters given a kernel, noiseless observations
    /// and a jitter of `100 * F::epsilon()`
    pub fn new(kernel: K) -> GpParams<F, K> {
        Self(GpValidParams {
            kernel,
            noise_variance: F::zero(),
            jitter: F::cast(100.0) * F::epsilon(),
        })
    }

    /// A constructor for GP parameters from validated parameters
    pub fn new_from_valid(params: &GpValidParams<F, K>) -> Self {
        Self(params.clone())
    }

    /// Set covariance kernel.
    pub fn kernel(mut self, kernel: K) -> Self {
        self.0.kernel = kernel;
        self
    }

    /// Set observation noise variance (0 for noiseless observations).
    pub fn noise_variance(mut self, noise_variance: F) -> Self {
        self.0.noise_variance = noise_variance;
        self
    }

    /// Set jitter.
    ///
    /// Jitter is added to the training covariance diagonal to keep it invertible
    /// when the kernel is only positive semi-definite. A too small value risks
    /// a factorization failure for near-singular Gram matrices.
    pub fn jitter(mut self, jitter: F) -> Self {
        self.0.jitter = jitter;
        self
    }
}

impl<F: Float> GpParams<F, KernelSpec<F>> {
    /// GP parameters with the default squared exponential kernel
    pub fn squared_exp() -> Self {
        GpParams::new(KernelSpec::default())
    }
}

impl<F: Float, K: Kernel<F>> From<GpValidParams<F, K>> for GpParams<F, K> {
    fn from(valid: GpValidParams<F, K>) -> Self {
        GpParams(valid)
    }
}

impl<F: Float, K: Kernel<F>> ParamGuard for GpParams<F, K> {
    type Checked = GpValidParams<F, K>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        self.0.kernel.check()?;
        if !(self.0.noise_variance.is_finite() && self.0.noise_variance >= F::zero()) {
            return Err(GpError::InvalidValueError(format!(
                "`noise_variance` should be non negative, got {}",
                self.0.noise_variance
            )));
        }
        if !(self.0.jitter.is_finite() && self.0.jitter >= F::zero()) {
            return Err(GpError::InvalidValueError(format!(
                "`jitter` should be non negative, got {}",
                self.0.jitter
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
