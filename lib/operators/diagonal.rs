//! Functions of the one-body Hamiltonian: time evolution, Boltzmann weights
//! and resolvents.
//!
//! Acting on a Slater determinant whose energy differs from that of the
//! reference state by `ΔE`, each of these reduces to multiplication by
//! `f(ΔE)`. No occupation is ever changed.

use num_complex::Complex64 as C64;
use crate::{
    hilbert::ModeBasis,
    operators::Record,
};

/// Parameters of a diagonal operator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Diagonal {
    /// Unitary evolution `exp(-i t (H - E_ref))`.
    TimeEvolution { t: f64 },
    /// Imaginary-time evolution `exp(-β (H - E_ref))`.
    Boltzmann { beta: f64 },
    /// Resolvent `1 / (z - sign (H - E_ref + offset))`.
    ///
    /// `sign = +1` gives the particle branch of a Green's function and
    /// `sign = -1` the hole branch.
    Resolvent { z: C64, sign: f64, offset: f64 },
}

/// A [`Diagonal`] bound to the basis providing mode energies.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DiagonalOperator<'a> {
    basis: &'a ModeBasis,
    kind: Diagonal,
}

impl<'a> DiagonalOperator<'a> {
    pub fn new(basis: &'a ModeBasis, kind: Diagonal) -> Self {
        Self { basis, kind }
    }

    /// Create `exp(-i t (H - E_ref))`.
    pub fn time_evolution(basis: &'a ModeBasis, t: f64) -> Self {
        Self::new(basis, Diagonal::TimeEvolution { t })
    }

    /// Create `exp(-β (H - E_ref))`.
    pub fn boltzmann(basis: &'a ModeBasis, beta: f64) -> Self {
        Self::new(basis, Diagonal::Boltzmann { beta })
    }

    /// Create `1 / (z - sign (H - E_ref + offset))`.
    pub fn resolvent(basis: &'a ModeBasis, z: C64, sign: f64, offset: f64)
        -> Self
    {
        Self::new(basis, Diagonal::Resolvent { z, sign, offset })
    }

    pub fn basis(&self) -> &'a ModeBasis { self.basis }

    pub fn kind(&self) -> Diagonal { self.kind }

    /// Value of the operator on a state with excitation energy `delta_e`
    /// above the reference.
    pub fn amplitude_at(&self, delta_e: f64) -> C64 {
        match self.kind {
            Diagonal::TimeEvolution { t }
                => (-C64::i() * t * delta_e).exp(),
            Diagonal::Boltzmann { beta }
                => C64::from((-beta * delta_e).exp()),
            Diagonal::Resolvent { z, sign, offset }
                => (z - sign * (delta_e + offset)).inv(),
        }
    }

    /// Value of the operator sitting at `position` in a fully assigned
    /// history given in written (left-to-right) order.
    ///
    /// The excitation energy is accumulated over the mode records to the left
    /// of `position`, with creation operators contributing `-ε` and
    /// destruction operators `+ε`. Diagonal records are skipped.
    pub fn amplitude(&self, history: &[Record], position: usize) -> C64 {
        self.amplitude_at(self.excitation(history, position))
    }

    /// Excitation energy seen by the operator at `position` in a written
    /// history; see [`Self::amplitude`].
    pub fn excitation(&self, history: &[Record], position: usize) -> f64 {
        history[..position].iter()
            .filter_map(|rec| match rec {
                Record::Mode { kind, mode, .. }
                    => Some(kind.energy_shift(self.basis.energy(*mode))),
                Record::Diagonal => None,
            })
            .sum()
    }

    /// Replace `self` with its Hermitian adjoint.
    pub fn transpose(&mut self) {
        match &mut self.kind {
            Diagonal::TimeEvolution { t } => { *t = -*t; },
            Diagonal::Boltzmann { .. } => { },
            Diagonal::Resolvent { z, .. } => { *z = z.conj(); },
        }
    }

    /// Return the Hermitian adjoint of `self`.
    pub fn transposed(mut self) -> Self {
        self.transpose();
        self
    }
}
