//! Error type shared across the crate.
//!
//! Only construction and configuration problems are errors. Algebraic zeros
//! (Pauli-forbidden operator applications, unpaired operators in a
//! contraction) are ordinary results and never surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FermionError {
    /// Returned when a one-body matrix is not square.
    #[error("error in basis creation: matrix is not square (got {0}×{1})")]
    NonSquare(usize, usize),

    /// Returned when a one-body matrix is not Hermitian to within tolerance.
    #[error("error in basis creation: matrix is not Hermitian (|H_ij - H_ji*| = {0:.3e})")]
    NotHermitian(f64),

    /// Returned when eigenvalue and eigenvector arrays have inconsistent
    /// shapes.
    #[error("error in basis creation: {energies} energies for a {rows}×{cols} eigenvector matrix")]
    IncompatibleEigendata { energies: usize, rows: usize, cols: usize },

    /// Returned when a basis is requested with zero flavors.
    #[error("error in basis creation: at least one flavor is required")]
    NoFlavors,

    /// Returned when the underlying LAPACK routine fails.
    #[error("error in basis creation: diagonalization failed: {0}")]
    Diagonalization(#[from] ndarray_linalg::error::LinalgError),

    /// Returned when a requested particle number exceeds the number of modes
    /// available to its flavor.
    #[error("error in state creation: {count} particles requested in flavor {flavor} but only {modes} modes exist")]
    InvalidParticleCount { flavor: usize, count: usize, modes: usize },

    /// Returned when the number of per-flavor particle counts does not match
    /// the number of flavors in the basis.
    #[error("error in state creation: expected {expected} flavor counts, got {got}")]
    FlavorCountMismatch { expected: usize, got: usize },

    /// Returned when an operator targets a site or mode outside the basis.
    #[error("error in operator creation: index {index} out of range for {modes} modes")]
    SiteOutOfRange { index: usize, modes: usize },

    /// Returned when an operator targets a flavor outside the basis.
    #[error("error in operator creation: flavor {flavor} out of range for {flavors} flavors")]
    FlavorOutOfRange { flavor: usize, flavors: usize },

    /// Returned when an inverse temperature is negative or NaN.
    #[error("error in ensemble creation: invalid inverse temperature {0}")]
    InvalidBeta(f64),

    /// Returned when a lattice cannot be built from its description.
    #[error("error in lattice creation: {0}")]
    InvalidLattice(String),

    /// Returned when an observable requires a different number of flavors.
    #[error("error in observable: requires {required} flavors, basis has {got}")]
    ObservableFlavors { required: usize, got: usize },

    /// Returned when a sweep would evaluate no points.
    #[error("error in sweep: no grid points")]
    EmptySweep,

    /// Returned when a result was expected to be real.
    #[error("error in output: value has non-negligible imaginary part {0:.3e}")]
    NonRealResult(f64),

    /// Returned when the worker pool cannot be built.
    #[error("error in sweep: cannot build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Returned when a configuration file cannot be read.
    #[error("error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when a configuration file cannot be parsed.
    #[error("error parsing config: {0}")]
    Config(#[from] toml::de::Error),
}
pub type FermionResult<T> = Result<T, FermionError>;
