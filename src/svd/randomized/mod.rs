//! # Randomized truncated SVD
//!
//! Range finder with power iterations: a Gaussian test matrix is pushed
//! through `(X Xᵗ)^q X`, the resulting block is orthonormalized into a basis
//! `Q` of the dominant column space, and a small dense SVD of `Qᵗ X` is lifted
//! back with `Q`. Costs `O(n m l)` per pass instead of a full SVD, with
//! `l = k + 10`.

use super::{Svd, SvdChain};
use crate::error::Result;
use crate::orthonormal::orthonormalize;
use log::debug;
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

/// Extra basis vectors carried beyond the target rank.
pub const OVERSAMPLES: usize = 10;

/// Seed used when the caller passes `0` or a negative seed.
pub const DEFAULT_SEED: u64 = 12345;

pub fn normalize_seed(seed: i32) -> u64 {
    if seed <= 0 {
        DEFAULT_SEED
    } else {
        seed as u64
    }
}

/// Approximate top-`k` SVD of a column-major `n x m` matrix.
///
/// `n_iter` power iterations are run, each followed by re-orthonormalization
/// of the block. Any failed orthonormalization aborts the decomposition. The
/// same `seed` always yields the same result.
pub fn decompose(
    x: &DMatrix<f32>,
    k: usize,
    n_iter: usize,
    seed: i32,
    chain: &SvdChain,
) -> Result<Svd> {
    let (n, m) = x.shape();
    let min_nm = n.min(m);
    let kk = k.min(min_nm);
    let l = (kk + OVERSAMPLES).min(min_nm);
    let seed = normalize_seed(seed);

    debug!(
        "randomized SVD: {}x{} matrix, k = {}, l = {}, {} power iterations, seed {}",
        n, m, kk, l, n_iter, seed
    );

    let omega = gaussian_matrix(m, l, seed);
    let mut y = x * &omega;

    for it in 0..n_iter {
        let z = x.tr_mul(&y);
        y = orthonormalize(x * &z)?;
        debug!("power iteration {} of {} done", it + 1, n_iter);
    }

    let q = orthonormalize(y)?;
    let b = q.tr_mul(x);

    let (u_hat, s, vt) = chain.decompose(&b)?.truncate(kk).into_parts();
    let u = &q * &u_hat;

    Svd::new(u, s, vt)
}

/// `rows x cols` matrix of independent standard normal draws, filled in
/// column-major order from a ChaCha8 stream seeded with `seed`.
pub(crate) fn gaussian_matrix(rows: usize, cols: usize, seed: u64) -> DMatrix<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    DMatrix::from_iterator(
        rows,
        cols,
        (0..rows * cols).map(|_| -> f32 { StandardNormal.sample(&mut rng) }),
    )
}
