use thiserror::Error;

/// The error type for decomposition operations.
#[derive(Debug, Error)]
pub enum DecompositionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{strategy} SVD failed: {reason}")]
    Factorization {
        strategy: &'static str,
        reason: String,
    },
    #[error("SVD failed after {attempts} attempt(s), last error: {last}")]
    SvdFailed { attempts: usize, last: String },
    #[error("QR orthonormalization failed: {0}")]
    Orthonormalization(String),
    #[error("model has not been fitted yet")]
    NotFitted,
}

pub type Result<T> = std::result::Result<T, DecompositionError>;
