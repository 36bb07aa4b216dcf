//! Occupation-number patterns: the Slater-determinant terms out of which all
//! many-body states are built.
//!
//! A pattern stores, for each flavor, a fixed-width bit set over the modes of
//! a [`ModeBasis`]. Canonical ordering of the underlying fermionic operators
//! is modes-within-flavor, flavors in ascending order; i.e. the ket
//! represented by a pattern is
//! ```text
//! Π_{f ascending} Π_{m ascending, occupied} c†_{f,m} |vac⟩
//! ```

use std::fmt;
use crate::{
    error::{ FermionError::*, FermionResult },
    hilbert::ModeBasis,
    operators::Kind,
};

const WORD: usize = u64::BITS as usize;

fn words_for(modes: usize) -> usize { (modes + WORD - 1) / WORD }

/// A fixed-size occupation pattern over `modes` modes in each of `flavors`
/// flavors.
///
/// Ordering is lexicographic over flavor blocks; it is only meaningful for
/// sorting and merging.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Occupation {
    modes: usize,
    flavors: usize,
    bits: Vec<u64>,
}

impl Occupation {
    /// Create the empty (vacuum) pattern.
    pub fn empty(modes: usize, flavors: usize) -> Self {
        Self { modes, flavors, bits: vec![0; words_for(modes) * flavors] }
    }

    /// Create a pattern with the lowest `counts[f]` modes of flavor `f`
    /// occupied, for each flavor `f`.
    pub fn filled(modes: usize, counts: &[usize]) -> FermionResult<Self> {
        let mut occ = Self::empty(modes, counts.len());
        for (flavor, &count) in counts.iter().enumerate() {
            if count > modes {
                return Err(InvalidParticleCount { flavor, count, modes });
            }
            (0..count).for_each(|m| occ.set(flavor, m, true));
        }
        Ok(occ)
    }

    /// Create a pattern from explicit lists of occupied modes, one list per
    /// flavor.
    ///
    /// Repeated modes are occupied once.
    pub fn from_modes<I, J>(modes: usize, occupied: I) -> FermionResult<Self>
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = usize>,
    {
        let lists: Vec<Vec<usize>>
            = occupied.into_iter()
            .map(|list| list.into_iter().collect())
            .collect();
        let mut occ = Self::empty(modes, lists.len());
        for (flavor, list) in lists.into_iter().enumerate() {
            for m in list {
                if m >= modes {
                    return Err(SiteOutOfRange { index: m, modes });
                }
                occ.set(flavor, m, true);
            }
        }
        Ok(occ)
    }

    /// Number of modes per flavor.
    pub fn modes(&self) -> usize { self.modes }

    /// Number of flavors.
    pub fn flavors(&self) -> usize { self.flavors }

    fn block(&self, flavor: usize) -> &[u64] {
        let w = words_for(self.modes);
        &self.bits[flavor * w..(flavor + 1) * w]
    }

    fn set(&mut self, flavor: usize, mode: usize, val: bool) {
        let k = flavor * words_for(self.modes) + mode / WORD;
        let mask = 1_u64 << (mode % WORD);
        if val { self.bits[k] |= mask; } else { self.bits[k] &= !mask; }
    }

    /// Return `true` if mode `mode` of flavor `flavor` is occupied.
    ///
    /// *Panics* if either index is out of range.
    pub fn is_occupied(&self, flavor: usize, mode: usize) -> bool {
        assert!(flavor < self.flavors && mode < self.modes);
        self.block(flavor)[mode / WORD] >> (mode % WORD) & 1 == 1
    }

    /// Number of occupied modes in one flavor.
    pub fn count(&self, flavor: usize) -> usize {
        self.block(flavor).iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of occupied modes in every flavor.
    pub fn counts(&self) -> Vec<usize> {
        (0..self.flavors).map(|f| self.count(f)).collect()
    }

    /// Total particle number.
    pub fn total(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the occupied modes of one flavor in ascending order.
    pub fn occupied(&self, flavor: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.modes).filter(move |m| self.is_occupied(flavor, *m))
    }

    /// Number of occupied modes that precede `(flavor, mode)` in canonical
    /// order.
    fn passed_over(&self, flavor: usize, mode: usize) -> u32 {
        let w = words_for(self.modes);
        let before_flavor: u32
            = self.bits[..flavor * w].iter().map(|x| x.count_ones()).sum();
        let block = self.block(flavor);
        let full: u32
            = block[..mode / WORD].iter().map(|x| x.count_ones()).sum();
        let partial = block[mode / WORD] & ((1_u64 << (mode % WORD)) - 1);
        before_flavor + full + partial.count_ones()
    }

    /// Apply a creation or destruction operator on `(flavor, mode)`.
    ///
    /// Returns the fermionic sign picked up by moving the operator past all
    /// occupied modes that precede it in canonical order, or `0` if the
    /// operator annihilates the state (creation on an occupied mode,
    /// destruction on an empty one). In the latter case `self` is left
    /// unchanged.
    ///
    /// *Panics* if either index is out of range.
    pub fn apply(&mut self, kind: Kind, flavor: usize, mode: usize) -> i32 {
        let occupied = self.is_occupied(flavor, mode);
        match (kind, occupied) {
            (Kind::Creation, true) | (Kind::Destruction, false) => 0,
            _ => {
                let sign
                    = if self.passed_over(flavor, mode) % 2 == 0 { 1 }
                    else { -1 };
                self.set(flavor, mode, !occupied);
                sign
            },
        }
    }

    /// Sum of the energies of all occupied modes, over all flavors.
    pub fn energy(&self, basis: &ModeBasis) -> f64 {
        (0..self.flavors)
            .flat_map(|f| self.occupied(f))
            .map(|m| basis.energy(m))
            .sum()
    }

    /// Number of `(flavor, mode)` slots on which two patterns differ.
    ///
    /// Patterns of different shapes are infinitely far apart.
    pub fn distance(&self, other: &Self) -> usize {
        if self.modes != other.modes || self.flavors != other.flavors {
            return usize::MAX;
        }
        self.bits.iter().zip(&other.bits)
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum()
    }
}

impl fmt::Display for Occupation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|")?;
        for flavor in 0..self.flavors {
            if flavor > 0 { write!(f, ",")?; }
            for m in 0..self.modes {
                write!(f, "{}", u8::from(self.is_occupied(flavor, m)))?;
            }
        }
        write!(f, "⟩")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Kind::*;

    #[test]
    fn pauli_exclusion() {
        let mut occ = Occupation::empty(70, 2);
        assert_eq!(occ.apply(Creation, 1, 66), 1);
        assert_eq!(occ.apply(Creation, 1, 66), 0);
        assert!(occ.is_occupied(1, 66));
        assert_eq!(occ.apply(Destruction, 0, 3), 0);
        assert_eq!(occ.total(), 1);
    }

    #[test]
    fn anticommutation() {
        let mut ab = Occupation::empty(4, 1);
        let s_ab = ab.apply(Creation, 0, 1) * ab.apply(Creation, 0, 3);
        let mut ba = Occupation::empty(4, 1);
        let s_ba = ba.apply(Creation, 0, 3) * ba.apply(Creation, 0, 1);
        assert_eq!(ab, ba);
        assert_eq!(s_ab, -s_ba);
    }

    #[test]
    fn sign_counts_earlier_flavors() {
        let mut occ = Occupation::from_modes(3, [vec![0, 2], vec![]]).unwrap();
        // two occupied modes in flavor 0 precede everything in flavor 1
        assert_eq!(occ.apply(Creation, 1, 0), 1);
        // flavor-0 modes 0, 2 and flavor-1 mode 0 precede flavor-1 mode 1
        assert_eq!(occ.apply(Creation, 1, 1), -1);
        // only flavor-0 mode 0 precedes flavor-0 mode 1
        assert_eq!(occ.apply(Creation, 0, 1), -1);
        assert_eq!(occ.counts(), vec![3, 2]);
    }

    #[test]
    fn filled_and_display() {
        let occ = Occupation::filled(4, &[2, 1]).unwrap();
        assert_eq!(occ.to_string(), "|1100,1000⟩");
        assert_eq!(occ.occupied(0).collect::<Vec<_>>(), vec![0, 1]);
        assert!(matches!(
            Occupation::filled(2, &[3]),
            Err(InvalidParticleCount { flavor: 0, count: 3, modes: 2 }),
        ));
    }

    #[test]
    fn distance_is_hamming() {
        let a = Occupation::filled(5, &[2]).unwrap();
        let b = Occupation::from_modes(5, [vec![1, 4]]).unwrap();
        assert_eq!(a.distance(&b), 2);
        assert_eq!(a.distance(&a), 0);
        assert_eq!(a.distance(&Occupation::empty(5, 2)), usize::MAX);
    }
}
