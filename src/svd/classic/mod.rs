use super::{Svd, SvdStrategy};
use crate::error::{DecompositionError, Result};
use nalgebra::DMatrix;

/// Golub–Kahan bidiagonalization followed by implicit-shift QR iteration
/// (nalgebra's dense SVD).
///
/// `max_iterations` bounds the total number of QR sweeps; `0` means iterate
/// until convergence. Running out of budget is reported as a factorization
/// failure.
#[derive(Debug, Clone, Copy)]
pub struct ClassicSvd {
    max_iterations: usize,
}

impl ClassicSvd {
    pub fn new() -> Self {
        ClassicSvd { max_iterations: 0 }
    }

    pub fn with_max_iterations(max_iterations: usize) -> Self {
        ClassicSvd { max_iterations }
    }
}

impl Default for ClassicSvd {
    fn default() -> Self {
        Self::new()
    }
}

impl SvdStrategy for ClassicSvd {
    fn name(&self) -> &'static str {
        "classic"
    }

    fn compute(&self, a: &DMatrix<f32>) -> Result<Svd> {
        let svd = a
            .clone()
            .try_svd(true, true, f32::EPSILON, self.max_iterations)
            .ok_or_else(|| DecompositionError::Factorization {
                strategy: self.name(),
                reason: format!(
                    "QR iteration did not converge within {} sweeps",
                    self.max_iterations
                ),
            })?;

        let u = svd.u.ok_or_else(|| DecompositionError::Factorization {
            strategy: self.name(),
            reason: "U was not computed".to_string(),
        })?;
        let vt = svd.v_t.ok_or_else(|| DecompositionError::Factorization {
            strategy: self.name(),
            reason: "Vt was not computed".to_string(),
        })?;

        Svd::new(u, svd.singular_values, vt)
    }
}
