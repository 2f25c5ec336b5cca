//! Per-call decomposition parameters.

use std::fmt;

/// Default size threshold: matrices whose smaller dimension does not exceed
/// this value always use the exact solver.
pub const DEFAULT_EXACT_THRESHOLD: usize = 256;

/// Which solver the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Exact for small matrices, randomized otherwise.
    #[default]
    Auto,
    /// Always the exact (full dense SVD) solver.
    Exact,
    /// Always the randomized solver.
    Randomized,
}

impl Algorithm {
    /// Interprets an algorithm hint string.
    ///
    /// `"exact"`, `"full"` and `"cusolver"` select the exact solver,
    /// `"randomized"`, `"random"` and `"rsvd"` force the randomized one.
    /// Anything else, including `"auto"` and `"power"`, leaves the choice to
    /// the size heuristic.
    pub fn from_hint(hint: &str) -> Self {
        match hint.trim().to_ascii_lowercase().as_str() {
            "exact" | "full" | "cusolver" => Algorithm::Exact,
            "randomized" | "random" | "rsvd" => Algorithm::Randomized,
            _ => Algorithm::Auto,
        }
    }
}

impl From<&str> for Algorithm {
    fn from(hint: &str) -> Self {
        Algorithm::from_hint(hint)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Auto => write!(f, "auto"),
            Algorithm::Exact => write!(f, "exact"),
            Algorithm::Randomized => write!(f, "randomized"),
        }
    }
}

/// Immutable configuration of one decomposition call.
///
/// `tol` and `whiten` are carried for interface symmetry with the
/// accelerator backend; the CPU solvers do not use them.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionParams {
    pub n_components: usize,
    pub algorithm: Algorithm,
    pub n_iter: usize,
    pub random_state: i32,
    pub tol: f32,
    pub verbose: bool,
    pub whiten: bool,
    pub exact_threshold: usize,
    pub flip_signs: bool,
}

impl DecompositionParams {
    pub fn builder() -> DecompositionParamsBuilder {
        DecompositionParamsBuilder::new()
    }
}

impl Default for DecompositionParams {
    fn default() -> Self {
        DecompositionParamsBuilder::new().build()
    }
}

/// Builder for [`DecompositionParams`].
///
/// Default values:
/// - `n_components`: 2
/// - `algorithm`: `Auto`
/// - `n_iter`: 5
/// - `random_state`: 0 (the randomized solver substitutes its fixed seed)
/// - `tol`: 1e-5
/// - `verbose`: false
/// - `whiten`: false
/// - `exact_threshold`: 256
/// - `flip_signs`: false
#[derive(Debug, Clone)]
pub struct DecompositionParamsBuilder {
    n_components: usize,
    algorithm: Algorithm,
    n_iter: usize,
    random_state: i32,
    tol: f32,
    verbose: bool,
    whiten: bool,
    exact_threshold: usize,
    flip_signs: bool,
}

impl Default for DecompositionParamsBuilder {
    fn default() -> Self {
        Self {
            n_components: 2,
            algorithm: Algorithm::Auto,
            n_iter: 5,
            random_state: 0,
            tol: 1e-5,
            verbose: false,
            whiten: false,
            exact_threshold: DEFAULT_EXACT_THRESHOLD,
            flip_signs: false,
        }
    }
}

impl DecompositionParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of components to keep. Clamped to `min(n, m)` at call time.
    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    pub fn algorithm(mut self, algorithm: impl Into<Algorithm>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Power iterations of the randomized solver.
    pub fn n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    pub fn random_state(mut self, random_state: i32) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn whiten(mut self, whiten: bool) -> Self {
        self.whiten = whiten;
        self
    }

    /// Largest `min(n, m)` for which `Auto` still picks the exact solver.
    pub fn exact_threshold(mut self, exact_threshold: usize) -> Self {
        self.exact_threshold = exact_threshold;
        self
    }

    /// Apply the deterministic sign convention to the components.
    pub fn flip_signs(mut self, flip_signs: bool) -> Self {
        self.flip_signs = flip_signs;
        self
    }

    pub fn build(self) -> DecompositionParams {
        DecompositionParams {
            n_components: self.n_components,
            algorithm: self.algorithm,
            n_iter: self.n_iter,
            random_state: self.random_state,
            tol: self.tol,
            verbose: self.verbose,
            whiten: self.whiten,
            exact_threshold: self.exact_threshold,
            flip_signs: self.flip_signs,
        }
    }
}
