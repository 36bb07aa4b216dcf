//! Single-fermion creation and destruction operators.

use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };
use crate::{
    error::{ FermionError::*, FermionResult },
    hilbert::ModeBasis,
    operators::{ Kind, Record },
};

/// Amplitudes below this magnitude are not expanded into eigenmodes.
pub const AMPLITUDE_CUTOFF: f64 = 1e-14;

/// Index space an operator's target refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Frame {
    /// A real-space lattice site; the operator is a superposition over all
    /// eigenmodes.
    Site,
    /// A single eigenmode.
    Mode,
}

/// A creation or destruction operator acting on a single site or eigenmode
/// of a given flavor.
///
/// In the site frame,
/// ```text
/// c†_i = Σ_m ⟨m|i⟩ c†_m
/// c_i  = Σ_m ⟨i|m⟩ c_m
/// ```
/// so that [`Self::evaluate`] conjugates the eigenvector entry for creation
/// operators only. Flipping [`Kind`] therefore produces the Hermitian adjoint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModeOperator<'a> {
    basis: &'a ModeBasis,
    kind: Kind,
    frame: Frame,
    index: usize,
    flavor: usize,
}

impl<'a> ModeOperator<'a> {
    /// Create a new operator, checking `index` and `flavor` against the
    /// basis.
    pub fn new(
        basis: &'a ModeBasis,
        kind: Kind,
        frame: Frame,
        index: usize,
        flavor: usize,
    ) -> FermionResult<Self>
    {
        if index >= basis.len() {
            return Err(SiteOutOfRange { index, modes: basis.len() });
        }
        if flavor >= basis.flavors() {
            return Err(FlavorOutOfRange {
                flavor,
                flavors: basis.flavors(),
            });
        }
        Ok(Self { basis, kind, frame, index, flavor })
    }

    /// Create an eigenmode operator from indices already known to fit the
    /// basis.
    pub(crate) fn eigen(basis: &'a ModeBasis, kind: Kind, mode: usize, flavor: usize)
        -> Self
    {
        debug_assert!(mode < basis.len() && flavor < basis.flavors());
        Self { basis, kind, frame: Frame::Mode, index: mode, flavor }
    }

    /// Create c†_{site, flavor}.
    pub fn creation(basis: &'a ModeBasis, site: usize, flavor: usize)
        -> FermionResult<Self>
    {
        Self::new(basis, Kind::Creation, Frame::Site, site, flavor)
    }

    /// Create c_{site, flavor}.
    pub fn destruction(basis: &'a ModeBasis, site: usize, flavor: usize)
        -> FermionResult<Self>
    {
        Self::new(basis, Kind::Destruction, Frame::Site, site, flavor)
    }

    /// Create c†_{mode, flavor} directly on an eigenmode.
    pub fn mode_creation(basis: &'a ModeBasis, mode: usize, flavor: usize)
        -> FermionResult<Self>
    {
        Self::new(basis, Kind::Creation, Frame::Mode, mode, flavor)
    }

    /// Create c_{mode, flavor} directly on an eigenmode.
    pub fn mode_destruction(basis: &'a ModeBasis, mode: usize, flavor: usize)
        -> FermionResult<Self>
    {
        Self::new(basis, Kind::Destruction, Frame::Mode, mode, flavor)
    }

    pub fn basis(&self) -> &'a ModeBasis { self.basis }

    pub fn kind(&self) -> Kind { self.kind }

    pub fn frame(&self) -> Frame { self.frame }

    pub fn index(&self) -> usize { self.index }

    pub fn flavor(&self) -> usize { self.flavor }

    /// Coefficient of the eigenmode operator on `mode` in the expansion of
    /// `self`.
    pub fn evaluate(&self, mode: usize) -> C64 {
        match (self.frame, self.kind) {
            (Frame::Mode, _) => {
                if mode == self.index { C64::one() } else { C64::zero() }
            },
            (Frame::Site, Kind::Creation)
                => self.basis.amplitude(self.index, mode).conj(),
            (Frame::Site, Kind::Destruction)
                => self.basis.amplitude(self.index, mode),
        }
    }

    /// Iterate over `(mode, coefficient)` pairs with non-negligible
    /// coefficient.
    pub fn candidates(&self) -> Candidates<'_, 'a> {
        let range
            = match self.frame {
                Frame::Site => 0..self.basis.len(),
                Frame::Mode => self.index..self.index + 1,
            };
        Candidates { op: self, modes: range }
    }

    /// Flip creation and destruction in place.
    pub fn transpose(&mut self) { self.kind = self.kind.adjoint(); }

    /// Return the transposed operator.
    pub fn transposed(mut self) -> Self {
        self.transpose();
        self
    }

    /// History entry for `self` assigned to eigenmode `mode`.
    pub fn record(&self, mode: usize) -> Record {
        Record::Mode { kind: self.kind, flavor: self.flavor, mode }
    }
}

/// Iterator over the eigenmode expansion of a [`ModeOperator`].
///
/// See [`ModeOperator::candidates`].
#[derive(Clone, Debug)]
pub struct Candidates<'b, 'a> {
    op: &'b ModeOperator<'a>,
    modes: std::ops::Range<usize>,
}

impl<'b, 'a> Iterator for Candidates<'b, 'a> {
    type Item = (usize, C64);

    fn next(&mut self) -> Option<Self::Item> {
        self.modes.by_ref()
            .map(|m| (m, self.op.evaluate(m)))
            .find(|(_, a)| a.norm() > AMPLITUDE_CUTOFF)
    }
}
