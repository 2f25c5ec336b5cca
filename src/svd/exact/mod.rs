//! Exact truncated SVD: a full dense decomposition cut down to the leading
//! `k` triplets.

use super::{Svd, SvdChain};
use crate::error::Result;
use log::debug;
use nalgebra::DMatrix;

/// Top-`k` SVD of a column-major `n x m` matrix.
///
/// Returns `min(k, min(n, m))` triplets in descending order. Fails only if
/// every strategy of `chain` fails.
pub fn decompose(x: &DMatrix<f32>, k: usize, chain: &SvdChain) -> Result<Svd> {
    let (n, m) = x.shape();
    let kk = k.min(n.min(m));
    debug!(
        "exact SVD: {}x{} matrix, keeping {} of {} components",
        n,
        m,
        kk,
        n.min(m)
    );

    Ok(chain.decompose(x)?.truncate(kk))
}
