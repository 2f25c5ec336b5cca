use super::{Svd, SvdStrategy};
use crate::error::Result;
use faer_ext::{IntoFaer, IntoNalgebra};
use nalgebra::{DMatrix, DVector};

/// faer's thin SVD: bidiagonalization followed by a divide-and-conquer
/// bidiagonal solver (Jacobi for very small blocks).
#[derive(Debug, Clone, Copy, Default)]
pub struct FaerSvd;

impl SvdStrategy for FaerSvd {
    fn name(&self) -> &'static str {
        "divide-and-conquer"
    }

    fn compute(&self, a: &DMatrix<f32>) -> Result<Svd> {
        let faer_mat = a.view((0, 0), a.shape()).into_faer();
        let svd = faer_mat.thin_svd();

        let u: DMatrix<f32> = svd.u().into_nalgebra().into_owned();
        let s = DVector::from_iterator(u.ncols(), svd.s_diagonal().iter().cloned());
        let vt: DMatrix<f32> = svd.v().into_nalgebra().transpose();

        Svd::new(u, s, vt)
    }
}
