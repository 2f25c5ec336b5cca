use super::{Svd, SvdStrategy};
use crate::error::{DecompositionError, Result};
use nalgebra::DMatrix;

/// LAPACK `sgesvd` through nalgebra-lapack.
///
/// LAPACK computes the full `U` (`n x n`) and `Vᵗ` (`m x m`); they are cut
/// down to the thin factors here.
#[derive(Debug, Clone, Copy, Default)]
pub struct LapackSvd;

impl SvdStrategy for LapackSvd {
    fn name(&self) -> &'static str {
        "lapack-gesvd"
    }

    fn compute(&self, a: &DMatrix<f32>) -> Result<Svd> {
        let (n, m) = a.shape();
        let r = n.min(m);

        let svd = nalgebra_lapack::SVD::new(a.clone()).ok_or_else(|| {
            DecompositionError::Factorization {
                strategy: self.name(),
                reason: "gesvd returned a non-zero info code".to_string(),
            }
        })?;

        let u = svd.u.columns(0, r).into_owned();
        let vt = svd.vt.rows(0, r).into_owned();

        Svd::new(u, svd.singular_values, vt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_svd() {
        let a = DMatrix::from_row_slice(3, 2, &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let svd = LapackSvd.compute(&a).unwrap();

        assert_eq!(svd.u().shape(), (3, 2));
        assert_eq!(svd.vt().shape(), (2, 2));

        let reconstructed = svd.reconstruct();
        for i in 0..3 {
            for j in 0..2 {
                assert_abs_diff_eq!(reconstructed[(i, j)], a[(i, j)], epsilon = 1e-4);
            }
        }
    }
}
