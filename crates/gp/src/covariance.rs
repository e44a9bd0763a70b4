//! Dense covariance matrices `K(A, B)[i, j] = k(A[i], B[j])` from a scalar kernel.
use crate::errors::Result;
use crate::kernels::Kernel;
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1, Ix2, Zip};
use rayon::prelude::*;

/// Computes the (len(a), len(b)) covariance matrix of kernel `k` between
/// coordinate sequences `a` and `b`.
///
/// Fails when the kernel hyperparameters are invalid.
pub fn covariance_matrix<F: Float, K: Kernel<F>>(
    a: &ArrayBase<impl Data<Elem = F>, Ix1>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    kernel: &K,
) -> Result<Array2<F>> {
    kernel.check()?;
    let mut k = Array2::zeros((a.len(), b.len()));
    Zip::indexed(&mut k).for_each(|(i, j), kij| *kij = kernel.value(a[i], b[j]));
    Ok(k)
}

/// Same as [`covariance_matrix`] with rows computed in parallel
pub fn par_covariance_matrix<F: Float, K: Kernel<F>>(
    a: &ArrayBase<impl Data<Elem = F> + Sync, Ix1>,
    b: &ArrayBase<impl Data<Elem = F> + Sync, Ix1>,
    kernel: &K,
) -> Result<Array2<F>> {
    kernel.check()?;
    let mut k = Array2::zeros((a.len(), b.len()));
    Zip::from(k.rows_mut())
        .and(a)
        .par_for_each(|row, ai| {
            Zip::from(row)
                .and(b)
                .for_each(|kij, bj| *kij = kernel.value(*ai, *bj))
        });
    Ok(k)
}

/// Computes covariance matrices between `a` and `b` for each of the given kernels.
///
/// Kernels are independent, they are evaluated in parallel and matrices are returned
/// in the kernels order. The first kernel failure is returned.
pub fn covariance_matrices<F: Float, K: Kernel<F>>(
    a: &ArrayBase<impl Data<Elem = F> + Sync, Ix1>,
    b: &ArrayBase<impl Data<Elem = F> + Sync, Ix1>,
    kernels: &[K],
) -> Result<Vec<Array2<F>>> {
    kernels
        .par_iter()
        .map(|kernel| covariance_matrix(a, b, kernel))
        .collect()
}

/// Returns true when the square matrix `m` equals its transpose within `epsilon`
pub fn is_symmetric<F: Float>(m: &ArrayBase<impl Data<Elem = F>, Ix2>, epsilon: F) -> bool {
    m.is_square()
        && m
            .indexed_iter()
            .all(|((i, j), v)| num_traits::Float::abs(*v - m[[j, i]]) <= epsilon)
}

/// Adds `value` to the diagonal of the square matrix `m`
pub(crate) fn add_to_diagonal<F: Float>(m: &mut Array2<F>, value: F) {
    m.diag_mut().mapv_inplace(|v| v + value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};
    use paste::paste;

    #[test]
    fn test_covariance_matrix() {
        let a = array![0., 1.];
        let b = array![0., 1., 2.];
        let k = covariance_matrix(&a, &b, &SquaredExponential::default()).unwrap();
        assert_eq!(k.dim(), (2, 3));
        let expected = array![
            [2., 1.2130613194252668, 0.2706705664732254],
            [1.2130613194252668, 2., 1.2130613194252668]
        ];
        assert_abs_diff_eq!(k, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_par_covariance_matrix() {
        let a = Array1::linspace(-5., 5., 20);
        let b = array![-4.1, -2.2, 0., 2.5, 4.1];
        let kernel = KernelSpec::from(RationalQuadratic::default());
        let k = covariance_matrix(&a, &b, &kernel).unwrap();
        let pk = par_covariance_matrix(&a, &b, &kernel).unwrap();
        assert_eq!(k, pk);
    }

    #[test]
    fn test_empty_sequence() {
        let a = Array1::<f64>::zeros(0);
        let b = array![0., 1.];
        let k = covariance_matrix(&a, &b, &Linear::default()).unwrap();
        assert_eq!(k.dim(), (0, 2));
    }

    #[test]
    fn test_invalid_kernel_propagates() {
        let a = array![0., 1.];
        let res = covariance_matrix(&a, &a, &Periodic::default().period(0.));
        assert!(res.is_err());
    }

    #[test]
    fn test_covariance_matrices_keep_kernel_order() {
        let a = Array1::linspace(-1., 1., 5);
        let config = KernelConfig::default();
        let kernels = KernelKind::ALL
            .iter()
            .map(|kind| KernelSpec::from_config(*kind, &config))
            .collect::<Vec<_>>();
        let ks = covariance_matrices(&a, &a, &kernels).unwrap();
        assert_eq!(ks.len(), 6);
        for (kernel, k) in kernels.iter().zip(ks.iter()) {
            assert_eq!(k, &covariance_matrix(&a, &a, kernel).unwrap());
        }
    }

    macro_rules! test_gram_symmetry {
        ($kernel:ident) => {
            paste! {
                #[test]
                fn [<test_ $kernel:snake _gram_symmetry>]() {
                    let x = array![-4.1, -2.2, 0., 2.5, 4.1, 0.37];
                    let k = covariance_matrix(&x, &x, &$kernel::<f64>::default()).unwrap();
                    assert!(is_symmetric(&k, 1e-12));
                    assert_abs_diff_eq!(k, k.t(), epsilon = 1e-12);
                }
            }
        };
    }

    test_gram_symmetry!(SquaredExponential);
    test_gram_symmetry!(RationalQuadratic);
    test_gram_symmetry!(Periodic);
    test_gram_symmetry!(LocallyPeriodic);
    test_gram_symmetry!(Linear);
    test_gram_symmetry!(Cosine);
}
