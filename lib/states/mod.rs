//! Many-body states of free fermions.
//!
//! Two interchangeable representations are provided behind
//! [`ManyBodyState`]:
//! - [`StateExpansion`] stores an explicit superposition of occupation
//!   patterns and applies every operator immediately. This is the cheaper
//!   choice for short chains of real-space operators.
//! - [`ChainKet`] only records operators and sums over all eigenmode
//!   assignments when an overlap is requested, contracting each assignment
//!   with [`sign::resolve`][crate::sign::resolve].
//!
//! Both produce the same numbers for the same operator products.

use num_complex::Complex64 as C64;
use crate::{
    hilbert::ModeBasis,
    occupation::Occupation,
    operators::Operator,
};

pub mod expansion;
pub use expansion::{ StateExpansion, EPSILON };

pub mod chain;
pub use chain::ChainKet;

/// Basic requirements for a many-body state representation.
pub trait ManyBodyState<'a>: Clone {
    /// Create the state consisting of a single occupation pattern with unit
    /// amplitude, which also serves as the energy reference for diagonal
    /// operators.
    ///
    /// `occupation` must have as many modes and flavors as `basis`.
    fn from_occupation(basis: &'a ModeBasis, occupation: Occupation) -> Self;

    /// Apply an operator from the left.
    fn apply(&mut self, op: &Operator<'a>);

    /// Bring the representation into a compact normal form, if it has one.
    fn simplify(&mut self) { }

    /// Compute the overlap ⟨self|other⟩.
    fn scalar_product(&self, other: &Self) -> C64;

    /// Apply a product of operators given in written (left-to-right) order,
    /// i.e. rightmost first.
    fn apply_written(&mut self, ops: &[Operator<'a>]) {
        for op in ops.iter().rev() {
            self.apply(op);
            self.simplify();
        }
    }

    /// Compute `⟨occupation| ops |occupation⟩` for a product of operators in
    /// written order.
    fn expectation(
        basis: &'a ModeBasis,
        occupation: &Occupation,
        ops: &[Operator<'a>],
    ) -> C64
    {
        let bra = Self::from_occupation(basis, occupation.clone());
        let mut ket = bra.clone();
        ket.apply_written(ops);
        bra.scalar_product(&ket)
    }
}
