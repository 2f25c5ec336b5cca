//! QR-based orthonormalization of column blocks, used by the randomized
//! range finder and between power iterations.

use crate::error::{DecompositionError, Result};
use log::debug;
use nalgebra::DMatrix;

/// Replaces the columns of an `n x l` column-major matrix by an orthonormal
/// basis of their span.
///
/// Householder QR followed by explicit formation of the thin orthogonal
/// factor. Requires `l <= n`. There is no fallback: a failure here is fatal
/// for the enclosing decomposition.
pub fn orthonormalize(a: DMatrix<f32>) -> Result<DMatrix<f32>> {
    let (n, l) = a.shape();
    if l > n {
        return Err(DecompositionError::Orthonormalization(format!(
            "cannot orthonormalize {} columns in dimension {}",
            l, n
        )));
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(DecompositionError::Orthonormalization(
            "input block contains non-finite values".to_string(),
        ));
    }

    let q = a.qr().q();

    if q.ncols() != l {
        return Err(DecompositionError::Orthonormalization(format!(
            "expected {} basis vectors, got {}",
            l,
            q.ncols()
        )));
    }
    if q.iter().any(|v| !v.is_finite()) {
        return Err(DecompositionError::Orthonormalization(
            "orthogonal factor contains non-finite values".to_string(),
        ));
    }

    debug!("orthonormalized {}x{} block", n, l);
    Ok(q)
}
