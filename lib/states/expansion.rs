//! Explicit superpositions of occupation patterns.

use std::{ borrow::Cow, cmp::Ordering };
use num_complex::Complex64 as C64;
use num_traits::Zero;
use tracing::trace;
use crate::{
    error::FermionResult,
    hilbert::ModeBasis,
    occupation::Occupation,
    operators::{ DiagonalOperator, Frame, ModeOperator, Operator },
    states::ManyBodyState,
};

/// Terms whose coefficient falls below this magnitude are dropped by
/// [`StateExpansion::simplify`].
pub const EPSILON: f64 = 1e-8;

/// A many-body state as a linear combination of occupation patterns over the
/// eigenmodes of a [`ModeBasis`].
///
/// Terms are appended freely; equal patterns are only merged by
/// [`Self::simplify`], which should be called regularly when applying long
/// operator chains since every site-frame operator multiplies the number of
/// terms by up to the number of modes.
///
/// Diagonal operators measure excitation energies relative to a reference
/// energy, which is that of the pattern the state was created from (or zero
/// for a state built up from nothing).
#[derive(Clone, Debug)]
pub struct StateExpansion<'a> {
    basis: &'a ModeBasis,
    terms: Vec<(Occupation, C64)>,
    reference_energy: f64,
    simplified: bool,
}

impl<'a> StateExpansion<'a> {
    /// Create a new, empty expansion (the zero vector).
    pub fn new(basis: &'a ModeBasis) -> Self {
        Self {
            basis,
            terms: Vec::new(),
            reference_energy: 0.0,
            simplified: true,
        }
    }

    /// Create the Fermi sea for the given per-flavor particle counts.
    pub fn filled(basis: &'a ModeBasis, counts: &[usize])
        -> FermionResult<Self>
    {
        let mut state = Self::new(basis);
        state.fill(counts)?;
        Ok(state)
    }

    /// Reset `self` to the Fermi sea for the given per-flavor particle
    /// counts, which also becomes the energy reference.
    pub fn fill(&mut self, counts: &[usize]) -> FermionResult<()> {
        let sea = self.basis.fermi_sea(counts)?;
        self.reference_energy = sea.energy(self.basis);
        self.terms.clear();
        self.terms.push((sea, C64::from(1.0)));
        self.simplified = true;
        Ok(())
    }

    pub fn basis(&self) -> &'a ModeBasis { self.basis }

    /// Energy relative to which diagonal operators act.
    pub fn reference_energy(&self) -> f64 { self.reference_energy }

    /// Number of stored terms.
    pub fn len(&self) -> usize { self.terms.len() }

    /// Return `true` if no terms are stored.
    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// Return `true` if the terms are currently in normal form.
    pub fn is_simplified(&self) -> bool { self.simplified }

    /// The stored terms.
    pub fn terms(&self) -> &[(Occupation, C64)] { &self.terms }

    /// Append a single term without merging.
    pub fn add_term(&mut self, occupation: Occupation, coeff: C64) {
        self.terms.push((occupation, coeff));
        self.simplified = false;
    }

    /// Append all terms of another expansion without merging.
    pub fn add(&mut self, other: &Self) {
        if other.is_empty() { return; }
        self.terms.extend(other.terms.iter().cloned());
        self.simplified = false;
    }

    /// Multiply every coefficient by `c`.
    pub fn scale(&mut self, c: C64) {
        self.terms.iter_mut().for_each(|(_, a)| { *a *= c; });
        self.simplified = false;
    }

    /// Total coefficient of a given pattern.
    pub fn coefficient(&self, occupation: &Occupation) -> C64 {
        self.terms.iter()
            .filter(|(occ, _)| occ == occupation)
            .map(|(_, c)| *c)
            .sum()
    }

    fn apply_mode(&mut self, op: &ModeOperator<'a>) {
        let kind = op.kind();
        let flavor = op.flavor();
        match op.frame() {
            Frame::Mode => {
                let m = op.index();
                self.terms.retain_mut(|(occ, c)| {
                    let sign = occ.apply(kind, flavor, m);
                    *c *= f64::from(sign);
                    sign != 0
                });
            },
            Frame::Site => {
                let width = op.candidates().count();
                let mut next: Vec<(Occupation, C64)>
                    = Vec::with_capacity(self.terms.len() * width);
                for (occ, c) in self.terms.iter() {
                    for (m, a) in op.candidates() {
                        let mut new = occ.clone();
                        let sign = new.apply(kind, flavor, m);
                        if sign != 0 {
                            next.push((new, *c * a * f64::from(sign)));
                        }
                    }
                }
                trace!(
                    before = self.terms.len(),
                    after = next.len(),
                    "expanded site operator",
                );
                self.terms = next;
            },
        }
        self.simplified = false;
    }

    fn apply_diagonal(&mut self, op: &DiagonalOperator<'a>) {
        let basis = self.basis;
        let e_ref = self.reference_energy;
        self.terms.iter_mut()
            .for_each(|(occ, c)| {
                *c *= op.amplitude_at(occ.energy(basis) - e_ref);
            });
        self.simplified = false;
    }

    /// Sort terms by pattern, merge equal patterns by summing their
    /// coefficients, and drop terms with magnitude below [`EPSILON`].
    pub fn simplify(&mut self) {
        if self.simplified { return; }
        let before = self.terms.len();
        self.terms.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        let mut merged: Vec<(Occupation, C64)>
            = Vec::with_capacity(self.terms.len());
        for (occ, c) in self.terms.drain(..) {
            match merged.last_mut() {
                Some((last, acc)) if *last == occ => { *acc += c; },
                _ => { merged.push((occ, c)); },
            }
        }
        merged.retain(|(_, c)| c.norm() >= EPSILON);
        trace!(before, after = merged.len(), "simplified expansion");
        self.terms = merged;
        self.simplified = true;
    }

    fn normal_terms(&self) -> Cow<'_, [(Occupation, C64)]> {
        if self.simplified {
            Cow::Borrowed(self.terms.as_slice())
        } else {
            let mut copy = self.clone();
            copy.simplify();
            Cow::Owned(copy.terms)
        }
    }

    /// Compute ⟨self|other⟩ by a merge-join over simplified term lists.
    ///
    /// States that are not already simplified are simplified on a copy.
    pub fn scalar_product(&self, other: &Self) -> C64 {
        let a = self.normal_terms();
        let b = other.normal_terms();
        let mut acc = C64::zero();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                Ordering::Less => { i += 1; },
                Ordering::Greater => { j += 1; },
                Ordering::Equal => {
                    acc += a[i].1.conj() * b[j].1;
                    i += 1;
                    j += 1;
                },
            }
        }
        acc
    }

    /// Squared norm ⟨self|self⟩.
    pub fn norm_sqr(&self) -> f64 { self.scalar_product(self).re }
}

impl<'a> ManyBodyState<'a> for StateExpansion<'a> {
    fn from_occupation(basis: &'a ModeBasis, occupation: Occupation) -> Self {
        debug_assert_eq!(occupation.modes(), basis.len());
        debug_assert_eq!(occupation.flavors(), basis.flavors());
        let reference_energy = occupation.energy(basis);
        Self {
            basis,
            terms: vec![(occupation, C64::from(1.0))],
            reference_energy,
            simplified: true,
        }
    }

    fn apply(&mut self, op: &Operator<'a>) {
        match op {
            Operator::Mode(op) => self.apply_mode(op),
            Operator::Diagonal(op) => self.apply_diagonal(op),
        }
    }

    fn simplify(&mut self) { StateExpansion::simplify(self) }

    fn scalar_product(&self, other: &Self) -> C64 {
        StateExpansion::scalar_product(self, other)
    }
}
