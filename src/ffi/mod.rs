//! C-callable entry points.
//!
//! Both functions take row-major `float` buffers sized for
//! `k = min(p.k, p.x_n, p.x_m)` and return a status code. Output buffers are
//! written only once the whole decomposition has succeeded, so a failed call
//! leaves them untouched.

use crate::dimred::{decompose, Centering, Decomposition};
use crate::error::{DecompositionError, Result};
use crate::layout::write_row_major;
use crate::params::{Algorithm, DecompositionParams};
use crate::svd::SvdChain;
use log::{debug, error};
use ndarray::ArrayView2;
use std::ffi::CStr;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub type StatusCode = libc::c_int;

pub const DIMREDUCE_SUCCESS: StatusCode = 0;
pub const DIMREDUCE_INVALID_ARGUMENT: StatusCode = -1;
pub const DIMREDUCE_SVD_FAILED: StatusCode = -2;
pub const DIMREDUCE_QR_FAILED: StatusCode = -3;
pub const DIMREDUCE_INTERNAL_ERROR: StatusCode = -4;

/// Parameters of one call, passed by value.
///
/// `gpu_id` is accepted for ABI compatibility and ignored.
#[repr(C)]
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy)]
pub struct dimreduce_params {
    pub x_n: libc::c_int,
    pub x_m: libc::c_int,
    pub k: libc::c_int,
    /// NUL-terminated hint, may be null.
    pub algorithm: *const libc::c_char,
    pub n_iter: libc::c_int,
    pub random_state: libc::c_int,
    pub tol: f32,
    pub verbose: libc::c_int,
    pub gpu_id: libc::c_int,
    pub whiten: bool,
}

/// Caller-owned output buffers.
struct Outputs {
    q: *mut f32,
    w: *mut f32,
    u: *mut f32,
    x_transformed: *mut f32,
    explained_variance: *mut f32,
    explained_variance_ratio: *mut f32,
    mean: *mut f32,
}

impl Outputs {
    fn wants_variance(&self) -> bool {
        !self.explained_variance.is_null() && !self.explained_variance_ratio.is_null()
    }

    /// Copies `d` into the caller buffers sized for an `n x m` input and `k`
    /// components. Shapes are checked up front, so either every requested
    /// buffer is written or none is.
    ///
    /// # Safety
    /// Every non-null pointer must be valid for its size.
    unsafe fn write(&self, d: &Decomposition, n: usize, m: usize, k: usize) -> Result<()> {
        if d.u.dim() != (n, k) || d.components.dim() != (k, m) {
            return Err(DecompositionError::InvalidInput(format!(
                "result shapes U {:?} and components {:?} do not match buffers for n = {}, m = {}, k = {}",
                d.u.dim(),
                d.components.dim(),
                n,
                m,
                k
            )));
        }

        write_row_major(
            d.components.view(),
            std::slice::from_raw_parts_mut(self.q, k * m),
        )?;
        write_row_major(
            d.singular_values.view(),
            std::slice::from_raw_parts_mut(self.w, k),
        )?;
        write_row_major(d.u.view(), std::slice::from_raw_parts_mut(self.u, n * k))?;
        write_row_major(
            d.transformed.view(),
            std::slice::from_raw_parts_mut(self.x_transformed, n * k),
        )?;

        if let (Some(ev), true) = (&d.explained_variance, self.wants_variance()) {
            write_row_major(
                ev.variance.view(),
                std::slice::from_raw_parts_mut(self.explained_variance, k),
            )?;
            write_row_major(
                ev.ratio.view(),
                std::slice::from_raw_parts_mut(self.explained_variance_ratio, k),
            )?;
        }

        if let (Some(mean), false) = (&d.mean, self.mean.is_null()) {
            write_row_major(mean.view(), std::slice::from_raw_parts_mut(self.mean, m))?;
        }
        Ok(())
    }
}

fn status_of(e: &DecompositionError) -> StatusCode {
    match e {
        DecompositionError::InvalidInput(_) | DecompositionError::NotFitted => {
            DIMREDUCE_INVALID_ARGUMENT
        }
        DecompositionError::Factorization { .. } | DecompositionError::SvdFailed { .. } => {
            DIMREDUCE_SVD_FAILED
        }
        DecompositionError::Orthonormalization(_) => DIMREDUCE_QR_FAILED,
    }
}

/// Converts the C parameters; `None` for negative dimensions or a
/// non-positive rank.
///
/// # Safety
/// `p.algorithm` must be null or point to a NUL-terminated string.
unsafe fn to_params(p: &dimreduce_params) -> Option<(usize, usize, DecompositionParams)> {
    if p.x_n <= 0 || p.x_m <= 0 || p.k <= 0 {
        return None;
    }
    let n = p.x_n as usize;
    let m = p.x_m as usize;

    let algorithm = if p.algorithm.is_null() {
        Algorithm::Auto
    } else {
        match CStr::from_ptr(p.algorithm).to_str() {
            Ok(hint) => Algorithm::from_hint(hint),
            Err(_) => Algorithm::Auto,
        }
    };

    let params = DecompositionParams::builder()
        .n_components((p.k as usize).min(n.min(m)))
        .algorithm(algorithm)
        .n_iter(p.n_iter.max(0) as usize)
        .random_state(p.random_state)
        .tol(p.tol)
        .verbose(p.verbose != 0)
        .whiten(p.whiten)
        .build();

    if p.gpu_id != 0 {
        debug!("gpu_id {} ignored by the CPU backend", p.gpu_id);
    }

    Some((n, m, params))
}

/// # Safety
/// See [`truncated_svd_float`].
unsafe fn run(x: *const f32, out: Outputs, p: dimreduce_params, centering: Centering) -> StatusCode {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let (n, m, params) = match to_params(&p) {
            Some(v) => v,
            None => {
                error!(
                    "invalid dimensions: x_n = {}, x_m = {}, k = {}",
                    p.x_n, p.x_m, p.k
                );
                return DIMREDUCE_INVALID_ARGUMENT;
            }
        };

        let x = ArrayView2::from_shape_ptr((n, m), x);
        let k = params.n_components;
        match decompose(
            x,
            &params,
            &SvdChain::standard(),
            centering,
            out.wants_variance(),
        )
        .and_then(|d| out.write(&d, n, m, k))
        {
            Ok(()) => DIMREDUCE_SUCCESS,
            Err(e) => {
                error!("decomposition failed: {}", e);
                status_of(&e)
            }
        }
    }));

    result.unwrap_or(DIMREDUCE_INTERNAL_ERROR)
}

/// Truncated SVD of the row-major `x_n x x_m` matrix `x`.
///
/// # Arguments
/// * `q` - `k x x_m` components (rows of Vᵗ)
/// * `w` - `k` singular values, descending
/// * `u` - `x_n x k` left singular vectors
/// * `x_transformed` - `x_n x k`, `u` scaled by `w`
/// * `explained_variance`, `explained_variance_ratio` - `k` values each,
///   written only when both are non-null
///
/// # Returns
/// Status code; on failure no buffer is written
///
/// # Safety
/// `x` must hold `x_n * x_m` readable floats and every non-null output must be
/// writable for its size.
#[no_mangle]
pub unsafe extern "C" fn truncated_svd_float(
    x: *const f32,
    q: *mut f32,
    w: *mut f32,
    u: *mut f32,
    x_transformed: *mut f32,
    explained_variance: *mut f32,
    explained_variance_ratio: *mut f32,
    p: dimreduce_params,
) -> StatusCode {
    if x.is_null() || q.is_null() || w.is_null() || u.is_null() || x_transformed.is_null() {
        return DIMREDUCE_INVALID_ARGUMENT;
    }

    let out = Outputs {
        q,
        w,
        u,
        x_transformed,
        explained_variance,
        explained_variance_ratio,
        mean: std::ptr::null_mut(),
    };
    run(x, out, p, Centering::None)
}

/// PCA of the row-major `x_n x x_m` matrix `x`.
///
/// Same buffers as [`truncated_svd_float`] plus `mean`, the `x_m` column
/// means.
///
/// # Safety
/// As for [`truncated_svd_float`]; `mean` must be writable for `x_m` floats.
#[no_mangle]
pub unsafe extern "C" fn pca_float(
    x: *const f32,
    q: *mut f32,
    w: *mut f32,
    u: *mut f32,
    x_transformed: *mut f32,
    explained_variance: *mut f32,
    explained_variance_ratio: *mut f32,
    mean: *mut f32,
    p: dimreduce_params,
) -> StatusCode {
    if x.is_null()
        || q.is_null()
        || w.is_null()
        || u.is_null()
        || x_transformed.is_null()
        || mean.is_null()
    {
        return DIMREDUCE_INVALID_ARGUMENT;
    }

    let out = Outputs {
        q,
        w,
        u,
        x_transformed,
        explained_variance,
        explained_variance_ratio,
        mean,
    };
    run(x, out, p, Centering::ColumnMean)
}

/// Installs `env_logger` (configured through `RUST_LOG`). Safe to call more
/// than once.
#[no_mangle]
pub extern "C" fn dimreduce_init_logging() {
    let _ = env_logger::try_init();
}
