//! Matrix generators shared by the unit tests.

use crate::layout::to_row_major;
use crate::orthonormal::orthonormalize;
use crate::svd::randomized::gaussian_matrix;
use nalgebra::DMatrix;
use ndarray::Array2;

pub fn random_column_major(n: usize, m: usize, seed: u64) -> DMatrix<f32> {
    gaussian_matrix(n, m, seed)
}

pub fn random_matrix(n: usize, m: usize, seed: u64) -> Array2<f32> {
    to_row_major(&gaussian_matrix(n, m, seed))
}

/// `U_r · diag(singular_values) · V_rᵗ + noise · E` with orthonormal `U_r`,
/// `V_r` and standard Gaussian `E`.
pub fn low_rank_matrix(
    n: usize,
    m: usize,
    singular_values: &[f32],
    noise: f32,
    seed: u64,
) -> Array2<f32> {
    let r = singular_values.len();
    let u = orthonormalize(gaussian_matrix(n, r, seed)).unwrap();
    let v = orthonormalize(gaussian_matrix(m, r, seed + 1)).unwrap();
    let s = DMatrix::from_diagonal(&nalgebra::DVector::from_row_slice(singular_values));

    let signal = &u * s * v.transpose();
    let x = signal + gaussian_matrix(n, m, seed + 2) * noise;
    to_row_major(&x)
}
