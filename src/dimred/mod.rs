//! # Dimensionality Reduction
//!
//! Truncated SVD and PCA of dense row-major `f32` matrices.
//!
//! ## Available
//! - **Truncated SVD** ([`tsvd`]): decomposition of the raw matrix
//! - **PCA** ([`pca`]): truncated SVD of the column-centered matrix
//!
//! ## Solver selection
//! - `Algorithm::Exact`, or `min(n, m) <= exact_threshold` (256 by default):
//!   full dense SVD, truncated
//! - otherwise: randomized range finder with power iterations
//!
//! `Algorithm::Randomized` forces the randomized solver whatever the size.

use crate::error::{DecompositionError, Result};
use crate::layout;
use crate::params::{Algorithm, DecompositionParams};
use crate::svd::{exact, randomized, SvdChain};
use crate::variance::{self, ExplainedVariance};
use log::{debug, log, Level};
use ndarray::{Array1, Array2, ArrayView2, CowArray};
use std::fmt;

pub mod pca;
pub mod tsvd;

pub use pca::{pca, Pca};
pub use tsvd::{truncated_svd, TruncatedSvd};

/// The solver that produced a decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    Exact,
    Randomized,
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solver::Exact => write!(f, "exact"),
            Solver::Randomized => write!(f, "randomized"),
        }
    }
}

/// Picks the solver for an `n x m` input.
pub fn select_solver(n: usize, m: usize, params: &DecompositionParams) -> Solver {
    match params.algorithm {
        Algorithm::Exact => Solver::Exact,
        Algorithm::Randomized => Solver::Randomized,
        Algorithm::Auto if n.min(m) <= params.exact_threshold => Solver::Exact,
        Algorithm::Auto => Solver::Randomized,
    }
}

/// Outputs of one truncated SVD or PCA call.
///
/// All matrices are row-major. With `k = min(n_components, n, m)`:
/// `components` is `k x m`, `u` and `transformed` are `n x k`,
/// `singular_values` has length `k` in descending order, `mean` (PCA only)
/// has length `m`.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub components: Array2<f32>,
    pub singular_values: Array1<f32>,
    pub u: Array2<f32>,
    /// `u` with column `j` scaled by `singular_values[j]`.
    pub transformed: Array2<f32>,
    pub explained_variance: Option<ExplainedVariance>,
    pub mean: Option<Array1<f32>>,
    pub solver: Solver,
}

impl Decomposition {
    pub fn n_components(&self) -> usize {
        self.singular_values.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Centering {
    None,
    ColumnMean,
}

/// Shared path of both entry points.
///
/// For PCA the centered matrix is built once and feeds both the solver and
/// the variance statistics.
pub(crate) fn decompose(
    x: ArrayView2<f32>,
    params: &DecompositionParams,
    chain: &SvdChain,
    centering: Centering,
    with_variance: bool,
) -> Result<Decomposition> {
    validate(x, params)?;

    let (n, m) = x.dim();
    let k = params.n_components.min(n.min(m));
    let solver = select_solver(n, m, params);

    let level = if params.verbose {
        Level::Info
    } else {
        Level::Debug
    };
    log!(
        level,
        "{} {}x{} -> {} components using the {} solver (hint: {}, n_iter: {})",
        if centering == Centering::ColumnMean {
            "PCA"
        } else {
            "truncated SVD"
        },
        n,
        m,
        k,
        solver,
        params.algorithm,
        params.n_iter
    );
    debug!(
        "tol = {} and whiten = {} are not used by the CPU solvers",
        params.tol, params.whiten
    );

    let (data, mean): (CowArray<f32, _>, Option<Array1<f32>>) = match centering {
        Centering::None => (CowArray::from(x), None),
        Centering::ColumnMean => {
            let (centered, mean) = center_columns(x);
            (CowArray::from(centered), Some(mean))
        }
    };

    let x_col = layout::to_column_major(data.view());
    let mut svd = match solver {
        Solver::Exact => exact::decompose(&x_col, k, chain)?,
        Solver::Randomized => randomized::decompose(
            &x_col,
            k,
            params.n_iter,
            params.random_state,
            chain,
        )?,
    };
    if params.flip_signs {
        svd.flip_signs();
    }

    let components = layout::to_row_major(svd.vt());
    let u = layout::to_row_major(svd.u());
    let singular_values: Array1<f32> = svd.s().iter().cloned().collect();
    let transformed = &u * &singular_values;

    let explained_variance = if with_variance {
        Some(ExplainedVariance::compute(
            data.view(),
            singular_values.view(),
        ))
    } else {
        None
    };

    Ok(Decomposition {
        components,
        singular_values,
        u,
        transformed,
        explained_variance,
        mean,
        solver,
    })
}

fn validate(x: ArrayView2<f32>, params: &DecompositionParams) -> Result<()> {
    let (n, m) = x.dim();
    if n == 0 || m == 0 {
        return Err(DecompositionError::InvalidInput(format!(
            "matrix must be non-empty, got {}x{}",
            n, m
        )));
    }
    if params.n_components == 0 {
        return Err(DecompositionError::InvalidInput(
            "n_components must be at least 1".to_string(),
        ));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(DecompositionError::InvalidInput(
            "matrix contains NaN or infinite values".to_string(),
        ));
    }
    Ok(())
}

/// Subtracts the column means (accumulated in `f64`) and returns the
/// centered copy together with the means.
fn center_columns(x: ArrayView2<f32>) -> (Array2<f32>, Array1<f32>) {
    let means = variance::column_means(x);
    let mut centered = x.as_standard_layout().into_owned();
    for (mut col, &mean) in centered.columns_mut().into_iter().zip(means.iter()) {
        col.mapv_inplace(|v| (v as f64 - mean) as f32);
    }
    (centered, means.mapv(|v| v as f32))
}

/// `(x - mean) · componentsᵗ`
fn project(
    x: ArrayView2<f32>,
    components: &Array2<f32>,
    mean: Option<&Array1<f32>>,
) -> Result<Array2<f32>> {
    if x.ncols() != components.ncols() {
        return Err(DecompositionError::InvalidInput(format!(
            "expected {} features, got {}",
            components.ncols(),
            x.ncols()
        )));
    }
    Ok(match mean {
        Some(mu) => (&x - mu).dot(&components.t()),
        None => x.dot(&components.t()),
    })
}

/// `z · components + mean`
fn reconstruct(
    z: ArrayView2<f32>,
    components: &Array2<f32>,
    mean: Option<&Array1<f32>>,
) -> Result<Array2<f32>> {
    if z.ncols() != components.nrows() {
        return Err(DecompositionError::InvalidInput(format!(
            "expected {} components, got {}",
            components.nrows(),
            z.ncols()
        )));
    }
    let mut out = z.dot(components);
    if let Some(mu) = mean {
        out += mu;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{low_rank_matrix, random_matrix};
    use ndarray::array;

    #[test]
    fn test_solver_selection() {
        let auto = DecompositionParams::default();
        assert_eq!(select_solver(500, 20, &auto), Solver::Exact);
        assert_eq!(select_solver(1000, 256, &auto), Solver::Exact);
        assert_eq!(select_solver(1000, 257, &auto), Solver::Randomized);

        let exact = DecompositionParams::builder().algorithm("cusolver").build();
        assert_eq!(select_solver(5000, 3000, &exact), Solver::Exact);

        let forced = DecompositionParams::builder().algorithm("randomized").build();
        assert_eq!(select_solver(500, 20, &forced), Solver::Randomized);

        let low = DecompositionParams::builder().exact_threshold(10).build();
        assert_eq!(select_solver(500, 20, &low), Solver::Randomized);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let params = DecompositionParams::default();
        let chain = SvdChain::standard();

        let empty = Array2::<f32>::zeros((0, 3));
        assert!(matches!(
            decompose(empty.view(), &params, &chain, Centering::None, true),
            Err(DecompositionError::InvalidInput(_))
        ));

        let x = array![[1.0f32, f32::NAN], [0.0, 1.0]];
        assert!(matches!(
            decompose(x.view(), &params, &chain, Centering::None, true),
            Err(DecompositionError::InvalidInput(_))
        ));

        let zero_k = DecompositionParams::builder().n_components(0).build();
        let x = array![[1.0f32, 2.0], [3.0, 4.0]];
        assert!(matches!(
            decompose(x.view(), &zero_k, &chain, Centering::None, true),
            Err(DecompositionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_variance_can_be_skipped() {
        let x = random_matrix(20, 6, 3);
        let params = DecompositionParams::builder().n_components(3).build();
        let d = decompose(
            x.view(),
            &params,
            &SvdChain::standard(),
            Centering::None,
            false,
        )
        .unwrap();

        assert!(d.explained_variance.is_none());
        assert_eq!(d.n_components(), 3);
    }

    #[test]
    fn test_transformed_is_scaled_u() {
        let x = random_matrix(15, 5, 8);
        let params = DecompositionParams::builder().n_components(4).build();
        let d = decompose(
            x.view(),
            &params,
            &SvdChain::standard(),
            Centering::None,
            true,
        )
        .unwrap();

        for i in 0..15 {
            for j in 0..4 {
                let expected = d.u[[i, j]] * d.singular_values[j];
                assert!((d.transformed[[i, j]] - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_center_columns() {
        let x = array![[1.0f32, 10.0], [3.0, 30.0]];
        let (centered, mean) = center_columns(x.view());

        assert_eq!(mean, array![2.0f32, 20.0]);
        assert_eq!(centered, array![[-1.0f32, -10.0], [1.0, 10.0]]);
    }

    #[test]
    fn test_flip_signs_is_applied() {
        let x = low_rank_matrix(40, 8, &[5.0, 3.0, 1.0], 0.01, 12);
        let params = DecompositionParams::builder()
            .n_components(3)
            .flip_signs(true)
            .build();
        let d = decompose(
            x.view(),
            &params,
            &SvdChain::standard(),
            Centering::None,
            true,
        )
        .unwrap();

        for row in d.components.rows() {
            let max = row
                .iter()
                .cloned()
                .fold(0.0f32, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            assert!(max > 0.0);
        }
    }

    #[test]
    fn test_projection_shape_checks() {
        let components = Array2::<f32>::zeros((2, 3));
        let bad = Array2::<f32>::zeros((4, 5));
        assert!(project(bad.view(), &components, None).is_err());
        assert!(reconstruct(bad.view(), &components, None).is_err());
    }
}
