//! Canonical thermal ensembles of Slater determinants.
//!
//! At fixed per-flavor particle number, the Gibbs state of a free-fermion
//! Hamiltonian is diagonal in occupation patterns over its eigenmodes, so a
//! thermal expectation value is a Boltzmann-weighted average of pure-state
//! expectation values taken over every pattern with the right counts.

use itertools::Itertools;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    error::{ FermionError::*, FermionResult },
    hilbert::ModeBasis,
    occupation::Occupation,
};

/// Members with normalized weight below this are discarded.
pub const WEIGHT_CUTOFF: f64 = 1e-12;

/// Energy window within which patterns count as degenerate ground states at
/// `β = ∞`.
pub const DEGENERACY_TOL: f64 = 1e-10;

/// A set of occupation patterns with normalized statistical weights.
#[derive(Clone, Debug)]
pub struct Ensemble {
    members: Vec<(Occupation, f64)>,
}

/// Every pattern with exactly `counts[f]` particles in flavor `f`.
fn enumerate(modes: usize, counts: &[usize]) -> Vec<Occupation> {
    counts.iter()
        .map(|&count| (0..modes).combinations(count).collect::<Vec<_>>())
        .multi_cartesian_product()
        .filter_map(|lists| Occupation::from_modes(modes, lists).ok())
        .collect()
}

impl Ensemble {
    /// A single pure pattern with unit weight.
    pub fn pure(occupation: Occupation) -> Self {
        Self { members: vec![(occupation, 1.0)] }
    }

    /// The zero-temperature Fermi sea.
    pub fn fermi_sea(basis: &ModeBasis, counts: &[usize])
        -> FermionResult<Self>
    {
        basis.fermi_sea(counts).map(Self::pure)
    }

    /// Enumerate the canonical ensemble at inverse temperature `beta`.
    ///
    /// Weights are `exp(-β (E - E_min)) / Z`. For `β = +∞` only the
    /// minimum-energy patterns are kept, with equal weights.
    pub fn canonical(basis: &ModeBasis, counts: &[usize], beta: f64)
        -> FermionResult<Self>
    {
        if beta.is_nan() || beta < 0.0 { return Err(InvalidBeta(beta)); }
        basis.check_counts(counts)?;
        let patterns = enumerate(basis.len(), counts);
        let energies: Vec<f64>
            = patterns.iter().map(|occ| occ.energy(basis)).collect();
        let e_min: f64
            = energies.iter().copied().fold(f64::INFINITY, f64::min);
        let weights: Vec<f64>
            = if beta.is_infinite() {
                energies.iter()
                    .map(|e| {
                        if e - e_min < DEGENERACY_TOL { 1.0 } else { 0.0 }
                    })
                    .collect()
            } else {
                energies.iter()
                    .map(|e| (-beta * (e - e_min)).exp())
                    .collect()
            };
        let Z: f64 = weights.iter().sum();
        let mut members: Vec<(Occupation, f64)>
            = patterns.into_iter()
            .zip(weights)
            .map(|(occ, w)| (occ, w / Z))
            .filter(|(_, w)| *w >= WEIGHT_CUTOFF)
            .collect();
        let kept: f64 = members.iter().map(|(_, w)| w).sum();
        members.iter_mut().for_each(|(_, w)| { *w /= kept; });
        debug!(
            beta,
            total = energies.len(),
            kept = members.len(),
            "built canonical ensemble",
        );
        Ok(Self { members })
    }

    /// Patterns and their normalized weights.
    pub fn members(&self) -> &[(Occupation, f64)] { &self.members }

    pub fn len(&self) -> usize { self.members.len() }

    pub fn is_empty(&self) -> bool { self.members.is_empty() }

    /// Weighted average `Σ w f(occupation)`.
    pub fn average<F>(&self, mut f: F) -> C64
    where F: FnMut(&Occupation) -> C64
    {
        self.members.iter()
            .map(|(occ, w)| *w * f(occ))
            .sum()
    }

    /// Thermal energy `Σ w E`.
    pub fn energy(&self, basis: &ModeBasis) -> f64 {
        self.members.iter()
            .map(|(occ, w)| w * occ.energy(basis))
            .sum()
    }
}
