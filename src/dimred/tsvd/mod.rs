//! # Truncated SVD
//!
//! Top-`k` singular triplets of the raw (uncentered) data matrix. Explained
//! variance is still reported relative to the column sample variances.

use super::{decompose, project, reconstruct, Centering, Decomposition};
use crate::error::{DecompositionError, Result};
use crate::params::DecompositionParams;
use crate::svd::SvdChain;
use ndarray::{Array1, Array2, ArrayView2};

/// One-shot truncated SVD of a row-major `n x m` matrix with the standard
/// SVD chain.
pub fn truncated_svd(x: ArrayView2<f32>, params: &DecompositionParams) -> Result<Decomposition> {
    decompose(x, params, &SvdChain::standard(), Centering::None, true)
}

/// Fit/transform wrapper around [`truncated_svd`].
///
/// A failed `fit` leaves the model as it was.
pub struct TruncatedSvd {
    params: DecompositionParams,
    svd_chain: SvdChain,
    fitted: Option<Decomposition>,
}

impl TruncatedSvd {
    pub fn new(params: DecompositionParams) -> Self {
        TruncatedSvd {
            params,
            svd_chain: SvdChain::standard(),
            fitted: None,
        }
    }

    /// Replaces the dense SVD strategies used for fitting.
    pub fn with_svd_chain(mut self, svd_chain: SvdChain) -> Self {
        self.svd_chain = svd_chain;
        self
    }

    pub fn params(&self) -> &DecompositionParams {
        &self.params
    }

    pub fn fit(&mut self, x: ArrayView2<f32>) -> Result<()> {
        let decomposition = decompose(x, &self.params, &self.svd_chain, Centering::None, true)?;
        self.fitted = Some(decomposition);
        Ok(())
    }

    /// Fits and returns `U · diag(S)`, which equals `x · componentsᵗ` up to
    /// rounding.
    pub fn fit_transform(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.fit(x)?;
        let fitted = self.fitted.as_ref().ok_or(DecompositionError::NotFitted)?;
        Ok(fitted.transformed.clone())
    }

    /// Projects new rows onto the fitted components: `x · componentsᵗ`.
    pub fn transform(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let fitted = self.fitted.as_ref().ok_or(DecompositionError::NotFitted)?;
        project(x, &fitted.components, None)
    }

    /// Maps component scores back to feature space: `z · components`.
    pub fn inverse_transform(&self, z: ArrayView2<f32>) -> Result<Array2<f32>> {
        let fitted = self.fitted.as_ref().ok_or(DecompositionError::NotFitted)?;
        reconstruct(z, &fitted.components, None)
    }

    pub fn decomposition(&self) -> Option<&Decomposition> {
        self.fitted.as_ref()
    }

    pub fn components(&self) -> Option<&Array2<f32>> {
        self.fitted.as_ref().map(|d| &d.components)
    }

    pub fn singular_values(&self) -> Option<&Array1<f32>> {
        self.fitted.as_ref().map(|d| &d.singular_values)
    }

    pub fn explained_variance(&self) -> Option<&Array1<f32>> {
        self.fitted
            .as_ref()
            .and_then(|d| d.explained_variance.as_ref())
            .map(|ev| &ev.variance)
    }

    pub fn explained_variance_ratio(&self) -> Option<&Array1<f32>> {
        self.fitted
            .as_ref()
            .and_then(|d| d.explained_variance.as_ref())
            .map(|ev| &ev.ratio)
    }

    pub fn cumulative_explained_variance_ratio(&self) -> Option<Array1<f32>> {
        self.fitted
            .as_ref()
            .and_then(|d| d.explained_variance.as_ref())
            .map(|ev| ev.cumulative_ratio())
    }
}
