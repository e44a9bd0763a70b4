//! This library implements [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process) regression
//! with a zero prior mean and pluggable scalar covariance kernels.
//!
//! The computation is a short pipeline:
//! * a [kernel](kernels) `k(a, b)` gives the covariance between two scalar inputs,
//! * the [covariance] builder applies it pairwise over two coordinate sequences,
//! * the [GaussianProcess] engine conditions the prior on observations with a regularized
//!   Cholesky solve and returns the posterior mean and covariance at query points,
//! * the [MultivariateNormal] sampler draws sample paths from a mean and covariance.
//!
//! GP engine is implemented by [GaussianProcess] parameterized by [GpParams].
//!
//! ```
//! use gpshow_gp::{kernels::*, GaussianProcess, SamplingMethod};
//! use ndarray::{array, Array1};
//! use ndarray_rand::rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256Plus;
//!
//! let kernel = KernelSpec::from_name("squared_exp", &KernelConfig::default()).unwrap();
//! let gp = GaussianProcess::params(kernel)
//!     .jitter(1e-2)
//!     .fit(&array![-4.1, -2.2, 0., 2.5, 4.1], &array![-2., 2.88, -2.96, 2.22, -3.5])
//!     .unwrap();
//!
//! let xtest = Array1::linspace(-5., 5., 50);
//! let mut rng = Xoshiro256Plus::seed_from_u64(42);
//! let paths = gp
//!     .sample(&xtest, 3, SamplingMethod::EigenValues { tolerance: 1e-8 }, &mut rng)
//!     .unwrap();
//! assert_eq!(paths.dim(), (3, 50));
//! ```
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
pub mod covariance;
mod errors;
pub mod kernels;
mod parameters;
mod sampling;

pub use algorithm::*;
pub use errors::*;
pub use parameters::*;
pub use sampling::*;
