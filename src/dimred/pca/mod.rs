//! # PCA
//!
//! Truncated SVD of the column-centered data. Column means are accumulated in
//! `f64` before being stored as `f32`.

use super::{decompose, project, reconstruct, Centering, Decomposition};
use crate::error::{DecompositionError, Result};
use crate::params::DecompositionParams;
use crate::svd::SvdChain;
use ndarray::{Array1, Array2, ArrayView2};

/// One-shot PCA of a row-major `n x m` matrix with the standard SVD chain.
pub fn pca(x: ArrayView2<f32>, params: &DecompositionParams) -> Result<Decomposition> {
    decompose(x, params, &SvdChain::standard(), Centering::ColumnMean, true)
}

pub struct PcaBuilder {
    params: DecompositionParams,
    svd_chain: SvdChain,
}

impl PcaBuilder {
    pub fn new(params: DecompositionParams) -> Self {
        PcaBuilder {
            params,
            svd_chain: SvdChain::standard(),
        }
    }

    pub fn svd_chain(mut self, svd_chain: SvdChain) -> Self {
        self.svd_chain = svd_chain;
        self
    }

    pub fn build(self) -> Pca {
        Pca {
            params: self.params,
            svd_chain: self.svd_chain,
            fitted: None,
        }
    }
}

pub struct Pca {
    params: DecompositionParams,
    svd_chain: SvdChain,
    fitted: Option<Decomposition>,
}

impl Pca {
    pub fn new(params: DecompositionParams) -> Self {
        PcaBuilder::new(params).build()
    }

    pub fn builder(params: DecompositionParams) -> PcaBuilder {
        PcaBuilder::new(params)
    }

    pub fn params(&self) -> &DecompositionParams {
        &self.params
    }

    pub fn fit(&mut self, x: ArrayView2<f32>) -> Result<()> {
        let decomposition = decompose(
            x,
            &self.params,
            &self.svd_chain,
            Centering::ColumnMean,
            true,
        )?;
        self.fitted = Some(decomposition);
        Ok(())
    }

    pub fn fit_transform(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.fit(x)?;
        let fitted = self.fitted.as_ref().ok_or(DecompositionError::NotFitted)?;
        Ok(fitted.transformed.clone())
    }

    /// `(x - mean) · componentsᵗ`
    pub fn transform(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let fitted = self.fitted.as_ref().ok_or(DecompositionError::NotFitted)?;
        project(x, &fitted.components, fitted.mean.as_ref())
    }

    /// `z · components + mean`
    pub fn inverse_transform(&self, z: ArrayView2<f32>) -> Result<Array2<f32>> {
        let fitted = self.fitted.as_ref().ok_or(DecompositionError::NotFitted)?;
        reconstruct(z, &fitted.components, fitted.mean.as_ref())
    }

    // Getters for the fitted values
    pub fn decomposition(&self) -> Option<&Decomposition> {
        self.fitted.as_ref()
    }

    pub fn components(&self) -> Option<&Array2<f32>> {
        self.fitted.as_ref().map(|d| &d.components)
    }

    pub fn mean(&self) -> Option<&Array1<f32>> {
        self.fitted.as_ref().and_then(|d| d.mean.as_ref())
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

    pub fn total_variance(&self) -> Option<f64> {
        self.fitted
            .as_ref()
            .and_then(|d| d.explained_variance.as_ref())
            .map(|ev| ev.total_variance)
    }
}
