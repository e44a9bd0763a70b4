//! Multivariate normal sampling of GP sample paths.
use crate::covariance::is_symmetric;
use crate::errors::{GpError, Result};
use linfa::Float;
use linfa_linalg::{cholesky::*, eigh::*};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use ndarray_stats::QuantileExt;
use rand_xoshiro::Xoshiro256Plus;

/// Decomposition used to factorize the covariance matrix `C = L.L^T`
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SamplingMethod<F: Float> {
    /// Cholesky decomposition, requires a positive definite covariance
    Cholesky,
    /// Eigen decomposition `W.diag(lambda).W^T`, eigenvalues in `[-tolerance, 0)` are
    /// set to zero, eigenvalues below `-tolerance` are rejected.
    EigenValues {
        /// Magnitude of negative eigenvalues accepted as floating point noise
        tolerance: F,
    },
}

impl<F: Float> Default for SamplingMethod<F> {
    fn default() -> Self {
        SamplingMethod::Cholesky
    }
}

/// A multivariate normal distribution `N(mean, covariance)` ready for sampling.
///
/// The covariance is factorized once at construction, each draw is then computed as
/// `mean + C.z` where `z ~ N(0, I)` and `C.C^T = covariance`.
#[derive(Clone, Debug)]
pub struct MultivariateNormal<F: Float> {
    mean: Array1<F>,
    factor: Array2<F>,
}

impl<F: Float> MultivariateNormal<F> {
    /// Constructor given a mean vector (m,) and a symmetric positive semi-definite
    /// covariance matrix (m, m)
    pub fn new(
        mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
        covariance: &ArrayBase<impl Data<Elem = F>, Ix2>,
        method: SamplingMethod<F>,
    ) -> Result<MultivariateNormal<F>> {
        let m = mean.len();
        if covariance.dim() != (m, m) {
            return Err(GpError::InvalidValueError(format!(
                "covariance shape {:?} should be ({m}, {m})",
                covariance.dim()
            )));
        }
        if m == 0 {
            return Ok(MultivariateNormal {
                mean: mean.to_owned(),
                factor: Array2::zeros((0, 0)),
            });
        }
        let scale = covariance
            .iter()
            .fold(F::one(), |acc, v| acc.max(num_traits::Float::abs(*v)));
        if !is_symmetric(covariance, F::cast(1e-8) * scale) {
            return Err(GpError::InvalidValueError(
                "covariance matrix should be symmetric".to_string(),
            ));
        }

        let factor = match method {
            SamplingMethod::Cholesky => covariance.cholesky().map_err(|err| {
                GpError::NotPositiveSemiDefinite(format!("cholesky decomposition failed: {err}"))
            })?,
            SamplingMethod::EigenValues { tolerance } => {
                if !(tolerance.is_finite() && tolerance >= F::zero()) {
                    return Err(GpError::InvalidValueError(format!(
                        "`tolerance` should be non negative, got {tolerance}"
                    )));
                }
                let (eigvals, eigvecs) = covariance.to_owned().eigh_into()?;
                let min_eigval = *eigvals
                    .min()
                    .map_err(|err| GpError::InvalidValueError(format!("eigenvalues: {err}")))?;
                if min_eigval < -tolerance {
                    return Err(GpError::NotPositiveSemiDefinite(format!(
                        "eigenvalue {min_eigval} below tolerance -{tolerance}"
                    )));
                }
                // eigenvalues accepted as noise are clamped to zero
                let sqrt_eigvals =
                    eigvals.mapv(|v| if v < F::zero() { F::zero() } else { v.sqrt() });
                eigvecs * &sqrt_eigvals
            }
        };
        Ok(MultivariateNormal {
            mean: mean.to_owned(),
            factor,
        })
    }

    /// Dimension of the distribution
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Mean vector
    pub fn mean(&self) -> &Array1<F> {
        &self.mean
    }

    /// Draw `count` independent realizations using the given random generator.
    /// Returns a (count, m) matrix, one draw per row.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Array2<F> {
        let z =
            Array2::<f64>::random_using((self.dim(), count), StandardNormal, rng).mapv(F::cast);
        let draws = self.factor.dot(&z) + self.mean.view().insert_axis(Axis(1));
        draws.reversed_axes()
    }

    /// Draw `count` independent realizations with a random generator seeded with `seed`
    /// for reproducibility.
    pub fn sample_with_seed(&self, count: usize, seed: u64) -> Array2<F> {
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        self.sample(count, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn mvn_data() -> (Array1<f64>, Array2<f64>) {
        (
            array![1., -2., 0.5],
            array![[2., 0.5, 0.], [0.5, 1., 0.2], [0., 0.2, 0.5]],
        )
    }

    #[test]
    fn test_sample_mean_consistency_cholesky() {
        let (mean, cov) = mvn_data();
        let mvn = MultivariateNormal::new(&mean, &cov, SamplingMethod::Cholesky).unwrap();
        let draws = mvn.sample_with_seed(10_000, 42);
        assert_eq!(draws.dim(), (10_000, 3));
        let empirical = draws.mean_axis(Axis(0)).unwrap();
        assert_abs_diff_eq!(empirical, mean, epsilon = 0.1);
    }

    #[test]
    fn test_sample_covariance_eigen() {
        let (mean, cov) = mvn_data();
        let mvn = MultivariateNormal::new(
            &mean,
            &cov,
            SamplingMethod::EigenValues { tolerance: 1e-10 },
        )
        .unwrap();
        let draws = mvn.sample_with_seed(10_000, 7);
        let empirical_mean = draws.mean_axis(Axis(0)).unwrap();
        assert_abs_diff_eq!(empirical_mean, mean, epsilon = 0.1);
        let centered = &draws - &empirical_mean;
        let empirical_cov = centered.t().dot(&centered) / (draws.nrows() as f64 - 1.);
        assert_abs_diff_eq!(empirical_cov, cov, epsilon = 0.15);
    }

    #[test]
    fn test_sample_reproducible() {
        let (mean, cov) = mvn_data();
        let mvn = MultivariateNormal::new(&mean, &cov, SamplingMethod::Cholesky).unwrap();
        assert_eq!(mvn.sample_with_seed(5, 3), mvn.sample_with_seed(5, 3));
    }

    #[test]
    fn test_semi_definite_covariance() {
        // rank one covariance: only the eigen decomposition can factorize it
        let mean = array![0., 0.];
        let cov = array![[1., 1.], [1., 1.]];
        let mvn = MultivariateNormal::new(
            &mean,
            &cov,
            SamplingMethod::EigenValues { tolerance: 1e-10 },
        )
        .unwrap();
        let draws = mvn.sample_with_seed(10, 42);
        for row in draws.rows() {
            assert_abs_diff_eq!(row[0], row[1], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_negative_eigenvalue_rejected() {
        let mean = array![0., 0.];
        let cov = array![[1., 2.], [2., 1.]];
        let res = MultivariateNormal::new(
            &mean,
            &cov,
            SamplingMethod::EigenValues { tolerance: 1e-10 },
        );
        assert!(matches!(res, Err(GpError::NotPositiveSemiDefinite(_))));
        let res = MultivariateNormal::new(&mean, &cov, SamplingMethod::Cholesky);
        assert!(matches!(res, Err(GpError::NotPositiveSemiDefinite(_))));
    }

    #[test]
    fn test_bad_shapes() {
        let mean = array![0., 0., 0.];
        let cov = array![[1., 0.], [0., 1.]];
        assert!(MultivariateNormal::new(&mean, &cov, SamplingMethod::Cholesky).is_err());
        let mean = array![0., 0.];
        let cov = array![[1., 0.5], [0., 1.]];
        assert!(MultivariateNormal::new(&mean, &cov, SamplingMethod::Cholesky).is_err());
    }
}
