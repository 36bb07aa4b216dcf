//! Operators acting on many-body states.
//!
//! Two families exist: [`ModeOperator`]s, which create or destroy a single
//! fermion (either on a lattice site, expanded over eigenmodes, or directly
//! on an eigenmode), and [`DiagonalOperator`]s, which are functions of the
//! Hamiltonian and therefore only ever multiply a Slater determinant by a
//! scalar that depends on its excitation energy.

use num_complex::Complex64 as C64;

pub mod mode;
pub use mode::{ ModeOperator, Frame };

pub mod diagonal;
pub use diagonal::{ DiagonalOperator, Diagonal };

/// Creation or destruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Creation,
    Destruction,
}

impl Kind {
    /// Swap creation and destruction.
    pub fn adjoint(self) -> Self {
        match self {
            Self::Creation => Self::Destruction,
            Self::Destruction => Self::Creation,
        }
    }

    /// Contribution of an operator of this kind on a mode of energy `e` to
    /// the excitation energy seen by everything to its right in a written
    /// product, i.e. `-e` for creation and `+e` for destruction.
    pub fn energy_shift(self, e: f64) -> f64 {
        match self {
            Self::Creation => -e,
            Self::Destruction => e,
        }
    }
}

/// One entry of an operator history in which every mode operator has been
/// assigned a definite eigenmode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Record {
    /// A creation or destruction operator on eigenmode `mode` of `flavor`.
    Mode { kind: Kind, flavor: usize, mode: usize },
    /// A diagonal operator, which takes no part in contractions.
    Diagonal,
}

/// Any operator that can be pushed onto a many-body state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Operator<'a> {
    Mode(ModeOperator<'a>),
    Diagonal(DiagonalOperator<'a>),
}

impl<'a> From<ModeOperator<'a>> for Operator<'a> {
    fn from(op: ModeOperator<'a>) -> Self { Self::Mode(op) }
}

impl<'a> From<DiagonalOperator<'a>> for Operator<'a> {
    fn from(op: DiagonalOperator<'a>) -> Self { Self::Diagonal(op) }
}

impl<'a> Operator<'a> {
    /// Replace `self` with its Hermitian adjoint.
    pub fn transpose(&mut self) {
        match self {
            Self::Mode(op) => op.transpose(),
            Self::Diagonal(op) => op.transpose(),
        }
    }

    /// Return the Hermitian adjoint of `self`.
    pub fn transposed(mut self) -> Self {
        self.transpose();
        self
    }

    /// Return `true` if `self` is a [`ModeOperator`].
    pub fn is_mode(&self) -> bool { matches!(self, Self::Mode(_)) }
}

/// Form the Hermitian adjoint of a product of operators.
///
/// The result uses the same ordering convention as `ops`, so this works for
/// written order and application order alike.
pub fn adjoint_product<'a>(ops: &[Operator<'a>]) -> Vec<Operator<'a>> {
    ops.iter().rev().map(|op| op.transposed()).collect()
}

/// Multiply the amplitudes of all diagonal operators in a fully assigned
/// history.
///
/// `written` is the history in written (left-to-right) order and `diags`
/// pairs each diagonal operator with its position in `written` and the
/// energy of its own reference state relative to the one the history returns
/// to.
pub(crate) fn diagonal_weight(
    written: &[Record],
    diags: &[(usize, DiagonalOperator<'_>, f64)],
) -> C64
{
    diags.iter()
        .map(|(pos, op, shift)| {
            op.amplitude_at(op.excitation(written, *pos) - shift)
        })
        .product()
}
