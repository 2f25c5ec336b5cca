//! # Layout conversion
//!
//! Callers hand over row-major data, the dense primitives want column-major
//! storage. Row-major matrices are carried as ndarray arrays in standard
//! layout, column-major matrices as `nalgebra::DMatrix`, so the type of a
//! matrix is also its layout tag.

use crate::error::{DecompositionError, Result};
use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView, ArrayView2, ArrayViewMut, Dimension};
use nshare::{IntoNalgebra, IntoNdarray2};

/// Copies a row-major matrix into a freshly allocated column-major matrix.
///
/// Views with arbitrary strides are accepted; they are normalised to standard
/// layout first.
pub fn to_column_major(x: ArrayView2<f32>) -> DMatrix<f32> {
    let x = x.as_standard_layout();
    x.view().into_nalgebra().clone_owned()
}

/// Copies a column-major matrix back into a row-major (standard layout) array.
pub fn to_row_major(a: &DMatrix<f32>) -> Array2<f32> {
    a.clone().into_ndarray2().as_standard_layout().into_owned()
}

/// Writes `src` in row-major order into a caller-owned buffer.
///
/// Works for vectors as well as matrices. `dst` must hold exactly
/// `src.len()` values, otherwise nothing is written.
pub fn write_row_major<D: Dimension>(src: ArrayView<f32, D>, dst: &mut [f32]) -> Result<()> {
    // from_shape accepts slices longer than the shape
    if dst.len() != src.len() {
        return Err(DecompositionError::InvalidInput(format!(
            "output buffer holds {} values, a {:?} result needs {}",
            dst.len(),
            src.shape(),
            src.len()
        )));
    }
    let mut out = ArrayViewMut::from_shape(src.raw_dim(), dst)
        .map_err(|e| DecompositionError::InvalidInput(e.to_string()))?;
    out.assign(&src);
    Ok(())
}
