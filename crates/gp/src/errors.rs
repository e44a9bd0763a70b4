use thiserror::Error;

/// A result type for GP posterior computations
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when using kernels, the [`GaussianProcess`](crate::GaussianProcess) engine
/// or the [`MultivariateNormal`](crate::MultivariateNormal) sampler
#[derive(Error, Debug)]
pub enum GpError {
    /// When linear algebra computation fails (singular or ill-conditioned matrix)
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When a kernel identifier is not registered
    #[error("Unknown kernel: {0}")]
    UnknownKernel(String),
    /// When a covariance matrix given to the sampler is not positive semi-definite
    #[error("Not positive semi-definite covariance: {0}")]
    NotPositiveSemiDefinite(String),
    /// When error due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}
