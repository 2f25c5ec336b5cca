pub mod dimred;
pub mod error;
pub mod ffi;
pub mod layout;
pub mod orthonormal;
pub mod params;
pub mod svd;
pub mod variance;

#[cfg(test)]
mod test_utils;

pub use dimred::{pca, truncated_svd, Decomposition, Pca, Solver, TruncatedSvd};
pub use error::{DecompositionError, Result};
pub use params::{Algorithm, DecompositionParams};
pub use variance::ExplainedVariance;
