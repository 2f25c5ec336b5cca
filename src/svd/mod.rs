//! # Dense singular value decompositions
//!
//! [`Svd`] is the `(U, S, Vᵗ)` triple shared by both solvers, stored
//! column-major. Dense factorizations are obtained through an [`SvdChain`]: an
//! ordered list of [`SvdStrategy`] implementations tried in turn, the first
//! success wins. The standard chain puts a divide-and-conquer SVD (faer) first
//! and the classic bidiagonal QR-iteration SVD (nalgebra) last.
//!
//! Every result leaving the chain has its singular values in descending order,
//! whatever order the underlying primitive produced.

use crate::error::{DecompositionError, Result};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

pub mod classic;
pub mod exact;
#[cfg(feature = "faer")]
pub mod faer;
#[cfg(feature = "lapack")]
pub mod lapack;
pub mod randomized;

pub use self::classic::ClassicSvd;
#[cfg(feature = "faer")]
pub use self::faer::FaerSvd;
#[cfg(feature = "lapack")]
pub use self::lapack::LapackSvd;

/// Thin or truncated singular value decomposition `A ≈ U · diag(S) · Vᵗ`.
///
/// `U` is `n x r`, `S` has length `r`, `Vᵗ` is `r x m`.
#[derive(Debug, Clone)]
pub struct Svd {
    u: DMatrix<f32>,
    s: DVector<f32>,
    vt: DMatrix<f32>,
}

impl Svd {
    pub fn new(u: DMatrix<f32>, s: DVector<f32>, vt: DMatrix<f32>) -> Result<Self> {
        if u.ncols() != s.len() || vt.nrows() != s.len() {
            return Err(DecompositionError::InvalidInput(format!(
                "inconsistent SVD factors: U is {}x{}, S has {} values, Vt is {}x{}",
                u.nrows(),
                u.ncols(),
                s.len(),
                vt.nrows(),
                vt.ncols()
            )));
        }
        Ok(Svd { u, s, vt })
    }

    pub fn u(&self) -> &DMatrix<f32> {
        &self.u
    }

    pub fn s(&self) -> &DVector<f32> {
        &self.s
    }

    pub fn vt(&self) -> &DMatrix<f32> {
        &self.vt
    }

    /// Number of retained singular triplets.
    pub fn rank(&self) -> usize {
        self.s.len()
    }

    pub fn into_parts(self) -> (DMatrix<f32>, DVector<f32>, DMatrix<f32>) {
        (self.u, self.s, self.vt)
    }

    // Reconstruct the (approximated) original matrix
    pub fn reconstruct(&self) -> DMatrix<f32> {
        &self.u * DMatrix::from_diagonal(&self.s) * &self.vt
    }

    /// Keeps the leading `k` triplets (or all of them if fewer exist).
    pub fn truncate(self, k: usize) -> Self {
        let k = k.min(self.rank());
        if k == self.rank() {
            return self;
        }
        Svd {
            u: self.u.columns(0, k).into_owned(),
            s: self.s.rows(0, k).into_owned(),
            vt: self.vt.rows(0, k).into_owned(),
        }
    }

    /// Deterministic sign convention: the largest-magnitude entry of every
    /// row of `Vᵗ` becomes positive, the matching column of `U` follows.
    pub fn flip_signs(&mut self) {
        for i in 0..self.vt.nrows() {
            let mut max_abs = 0.0f32;
            let mut max_idx = 0;
            for (j, v) in self.vt.row(i).iter().enumerate() {
                if v.abs() > max_abs {
                    max_abs = v.abs();
                    max_idx = j;
                }
            }
            if self.vt[(i, max_idx)] < 0.0 {
                self.vt.row_mut(i).neg_mut();
                self.u.column_mut(i).neg_mut();
            }
        }
    }

    fn is_finite(&self) -> bool {
        self.u.iter().all(|v| v.is_finite())
            && self.s.iter().all(|v| v.is_finite())
            && self.vt.iter().all(|v| v.is_finite())
    }

    fn sort_descending(&mut self) {
        let mut order: Vec<usize> = (0..self.s.len()).collect();
        order.sort_by(|&a, &b| self.s[b].total_cmp(&self.s[a]));

        if order.iter().enumerate().all(|(i, &idx)| i == idx) {
            return;
        }

        self.u = self.u.select_columns(order.iter());
        self.vt = self.vt.select_rows(order.iter());
        self.s = DVector::from_iterator(order.len(), order.iter().map(|&idx| self.s[idx]));
    }
}

/// A dense SVD primitive.
///
/// Implementations return the thin decomposition of `a`: for an `n x m`
/// input, `U` is `n x min(n, m)` and `Vᵗ` is `min(n, m) x m`. Ordering of the
/// singular values is not required.
pub trait SvdStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute(&self, a: &DMatrix<f32>) -> Result<Svd>;
}

/// Ordered list of SVD strategies, tried until one succeeds.
pub struct SvdChain {
    strategies: Vec<Box<dyn SvdStrategy>>,
}

impl SvdChain {
    /// A chain without strategies, to be filled with [`SvdChain::with`].
    /// Every decomposition through it fails until a strategy is added.
    pub fn empty() -> Self {
        SvdChain {
            strategies: Vec::new(),
        }
    }

    /// Divide-and-conquer first (with the `faer` feature), then LAPACK
    /// `gesvd` (with the `lapack` feature), then the classic nalgebra SVD.
    pub fn standard() -> Self {
        #[allow(unused_mut)]
        let mut chain = SvdChain::empty();
        #[cfg(feature = "faer")]
        {
            chain = chain.with(FaerSvd);
        }
        #[cfg(feature = "lapack")]
        {
            chain = chain.with(LapackSvd);
        }
        chain.with(ClassicSvd::new())
    }

    pub fn with<S: SvdStrategy + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Thin SVD of `a` with singular values sorted in descending order.
    pub fn decompose(&self, a: &DMatrix<f32>) -> Result<Svd> {
        let (n, m) = a.shape();
        let mut last_error = None;

        for strategy in &self.strategies {
            match strategy
                .compute(a)
                .and_then(|svd| check_result(svd, n, m, strategy.name()))
            {
                Ok(mut svd) => {
                    svd.sort_descending();
                    debug!("{} SVD of {}x{} matrix succeeded", strategy.name(), n, m);
                    return Ok(svd);
                }
                Err(e) => {
                    warn!("{} SVD of {}x{} matrix failed: {}", strategy.name(), n, m, e);
                    last_error = Some(e);
                }
            }
        }

        Err(DecompositionError::SvdFailed {
            attempts: self.strategies.len(),
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no SVD strategy configured".to_string()),
        })
    }
}

impl Default for SvdChain {
    fn default() -> Self {
        Self::standard()
    }
}

fn check_result(svd: Svd, n: usize, m: usize, strategy: &'static str) -> Result<Svd> {
    let r = n.min(m);
    if svd.u.nrows() != n || svd.vt.ncols() != m || svd.rank() != r {
        return Err(DecompositionError::Factorization {
            strategy,
            reason: format!(
                "unexpected factor shapes: U {}x{}, Vt {}x{} for a {}x{} input",
                svd.u.nrows(),
                svd.u.ncols(),
                svd.vt.nrows(),
                svd.vt.ncols(),
                n,
                m
            ),
        });
    }
    if !svd.is_finite() {
        return Err(DecompositionError::Factorization {
            strategy,
            reason: "factors contain non-finite values".to_string(),
        });
    }
    Ok(svd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FailingSvd {
        calls: Arc<AtomicUsize>,
    }

    impl SvdStrategy for FailingSvd {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn compute(&self, _a: &DMatrix<f32>) -> Result<Svd> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DecompositionError::Factorization {
                strategy: self.name(),
                reason: "info = 1".to_string(),
            })
        }
    }

    /// Returns the classic result with the triplets in ascending order.
    struct AscendingSvd;

    impl SvdStrategy for AscendingSvd {
        fn name(&self) -> &'static str {
            "ascending"
        }

        fn compute(&self, a: &DMatrix<f32>) -> Result<Svd> {
            let (u, s, vt) = ClassicSvd::new().compute(a)?.into_parts();
            let r = s.len();
            let order: Vec<usize> = (0..r).rev().collect();
            Svd::new(
                u.select_columns(order.iter()),
                DVector::from_iterator(r, order.iter().map(|&i| s[i])),
                vt.select_rows(order.iter()),
            )
        }
    }

    fn sample_matrix() -> DMatrix<f32> {
        DMatrix::from_row_slice(
            4,
            3,
            &[
                1.0, 0.5, 0.25, //
                0.25, 0.5, 1.0, //
                1.5, 2.0, 0.0, //
                0.0, 0.25, 2.0,
            ],
        )
    }

    #[test]
    fn test_fallback_after_primary_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = SvdChain::empty()
            .with(FailingSvd {
                calls: calls.clone(),
            })
            .with(ClassicSvd::new());

        let a = sample_matrix();
        let svd = chain.decompose(&a).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(svd.rank(), 3);
        let recon = svd.reconstruct();
        for (r, x) in recon.iter().zip(a.iter()) {
            assert_abs_diff_eq!(*r, *x, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_all_strategies_failing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = SvdChain::empty()
            .with(FailingSvd {
                calls: calls.clone(),
            })
            .with(FailingSvd {
                calls: calls.clone(),
            });

        match chain.decompose(&sample_matrix()) {
            Err(DecompositionError::SvdFailed { attempts, last }) => {
                assert_eq!(attempts, 2);
                assert!(last.contains("failing"));
            }
            other => panic!("expected SvdFailed, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_chain_fails() {
        let chain = SvdChain::empty();
        assert!(chain.is_empty());
        assert!(matches!(
            chain.decompose(&sample_matrix()),
            Err(DecompositionError::SvdFailed { attempts: 0, .. })
        ));
    }

    #[test]
    fn test_results_are_sorted_descending() {
        let chain = SvdChain::empty().with(AscendingSvd);
        let a = sample_matrix();
        let svd = chain.decompose(&a).unwrap();

        let s = svd.s();
        assert!(s[0] >= s[1] && s[1] >= s[2]);

        // Reordering must keep the triplets together.
        let recon = svd.reconstruct();
        for (r, x) in recon.iter().zip(a.iter()) {
            assert_abs_diff_eq!(*r, *x, epsilon = 1e-5);
        }

        let expected = SvdChain::empty()
            .with(ClassicSvd::new())
            .decompose(&a)
            .unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(s[i], expected.s()[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_truncate_keeps_leading_triplets() {
        let svd = SvdChain::standard().decompose(&sample_matrix()).unwrap();
        let s0 = svd.s()[0];
        let truncated = svd.truncate(2);

        assert_eq!(truncated.rank(), 2);
        assert_eq!(truncated.u().shape(), (4, 2));
        assert_eq!(truncated.vt().shape(), (2, 3));
        assert_eq!(truncated.s()[0], s0);

        assert_eq!(truncated.truncate(10).rank(), 2);
    }

    #[test]
    fn test_flip_signs_makes_largest_loading_positive() {
        let mut svd = SvdChain::standard().decompose(&sample_matrix()).unwrap();
        let before = svd.reconstruct();
        svd.flip_signs();

        for i in 0..svd.rank() {
            let row = svd.vt().row(i);
            let max = row
                .iter()
                .cloned()
                .fold(0.0f32, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            assert!(max > 0.0);
        }

        let after = svd.reconstruct();
        for (a, b) in after.iter().zip(before.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_inconsistent_factors_rejected() {
        let u = DMatrix::<f32>::zeros(3, 2);
        let s = DVector::<f32>::zeros(3);
        let vt = DMatrix::<f32>::zeros(2, 4);
        assert!(Svd::new(u, s, vt).is_err());
    }

    #[test]
    fn test_default_is_standard_chain() {
        assert_eq!(SvdChain::default().names(), SvdChain::standard().names());
        assert!(!SvdChain::default().is_empty());
        assert!(SvdChain::empty().is_empty());
    }

    #[test]
    fn test_standard_chain_order() {
        let names = SvdChain::standard().names();
        assert_eq!(names.last(), Some(&"classic"));
        #[cfg(feature = "faer")]
        assert_eq!(names.first(), Some(&"divide-and-conquer"));
    }
}
