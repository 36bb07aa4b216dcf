//! Single-particle eigenbasis of a one-body hopping Hamiltonian.
//!
//! Every many-body object in the crate borrows a [`ModeBasis`]; nothing
//! mutates it after construction, so a single instance can be shared by
//! reference across worker threads.

use ndarray as nd;
use ndarray_linalg::{ EighInto, UPLO };
use num_complex::Complex64 as C64;
use crate::{
    error::{ FermionError::*, FermionResult },
    occupation::Occupation,
};

/// Tolerance on `|H_ij - conj(H_ji)|` when accepting a one-body matrix.
pub const HERMITIAN_TOL: f64 = 1e-10;

/// Eigenvalues and eigenvectors of a Hermitian one-body matrix, shared by a
/// fixed number of independent flavors.
///
/// Modes are indexed `0..len()` in ascending order of energy. The columns of
/// the eigenvector matrix are the modes, so that `vectors()[[i, m]]` is the
/// overlap ⟨i|m⟩ of real-space site `i` with mode `m`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeBasis {
    energies: nd::Array1<f64>,
    vectors: nd::Array2<C64>,
    flavors: usize,
}

impl ModeBasis {
    /// Diagonalize a complex Hermitian one-body matrix.
    pub fn from_hopping(H: nd::Array2<C64>, flavors: usize)
        -> FermionResult<Self>
    {
        let (n, m) = H.dim();
        if n != m { return Err(NonSquare(n, m)); }
        if flavors == 0 { return Err(NoFlavors); }
        let asym: f64
            = H.indexed_iter()
            .map(|((i, j), hij)| (*hij - H[[j, i]].conj()).norm())
            .fold(0.0, f64::max);
        if asym > HERMITIAN_TOL { return Err(NotHermitian(asym)); }
        let (E, V) = H.eigh_into(UPLO::Lower)?;
        Ok(Self { energies: E, vectors: V, flavors })
    }

    /// Diagonalize a real symmetric one-body matrix.
    pub fn from_real_hopping(H: &nd::Array2<f64>, flavors: usize)
        -> FermionResult<Self>
    {
        Self::from_hopping(H.mapv(C64::from), flavors)
    }

    /// Assemble a basis from already-diagonalized data.
    ///
    /// The eigenvector matrix must be square with one column per energy.
    /// Unitarity is assumed, not checked.
    pub fn from_parts(
        energies: nd::Array1<f64>,
        vectors: nd::Array2<C64>,
        flavors: usize,
    ) -> FermionResult<Self>
    {
        let (rows, cols) = vectors.dim();
        if rows != cols || cols != energies.len() {
            return Err(IncompatibleEigendata {
                energies: energies.len(),
                rows,
                cols,
            });
        }
        if flavors == 0 { return Err(NoFlavors); }
        Ok(Self { energies, vectors, flavors })
    }

    /// Number of single-particle modes (equivalently, lattice sites) per
    /// flavor.
    pub fn len(&self) -> usize { self.energies.len() }

    /// Return `true` if the basis has no modes.
    pub fn is_empty(&self) -> bool { self.energies.is_empty() }

    /// Number of flavors.
    pub fn flavors(&self) -> usize { self.flavors }

    /// Energy of mode `m`.
    ///
    /// *Panics* if `m` is out of range.
    pub fn energy(&self, m: usize) -> f64 { self.energies[m] }

    /// All mode energies, ascending.
    pub fn energies(&self) -> &nd::Array1<f64> { &self.energies }

    /// Overlap ⟨site|mode⟩.
    ///
    /// *Panics* if either index is out of range.
    pub fn amplitude(&self, site: usize, mode: usize) -> C64 {
        self.vectors[[site, mode]]
    }

    /// The full eigenvector matrix, modes as columns.
    pub fn vectors(&self) -> &nd::Array2<C64> { &self.vectors }

    /// Check that a list of per-flavor particle counts fits this basis.
    pub fn check_counts(&self, counts: &[usize]) -> FermionResult<()> {
        if counts.len() != self.flavors {
            return Err(FlavorCountMismatch {
                expected: self.flavors,
                got: counts.len(),
            });
        }
        counts.iter().enumerate()
            .try_for_each(|(flavor, &count)| {
                (count <= self.len()).then_some(())
                    .ok_or(InvalidParticleCount {
                        flavor,
                        count,
                        modes: self.len(),
                    })
            })
    }

    /// The Fermi sea: the lowest `counts[f]` modes of each flavor occupied.
    pub fn fermi_sea(&self, counts: &[usize]) -> FermionResult<Occupation> {
        self.check_counts(counts)?;
        Occupation::filled(self.len(), counts)
    }

    /// Total energy of the Fermi sea for the given particle counts.
    pub fn ground_energy(&self, counts: &[usize]) -> FermionResult<f64> {
        self.fermi_sea(counts).map(|sea| sea.energy(self))
    }
}
