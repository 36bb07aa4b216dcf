//! Lazily contracted operator chains.

use std::iter;
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };
use tracing::trace;
use crate::{
    error::FermionResult,
    hilbert::ModeBasis,
    occupation::Occupation,
    operators::{
        adjoint_product,
        diagonal_weight,
        DiagonalOperator,
        Kind,
        ModeOperator,
        Operator,
        Record,
    },
    sign,
    states::ManyBodyState,
};

/// A many-body state represented as `weight · O_n ⋯ O_1 |reference⟩`.
///
/// Applying an operator only records it. Overlaps are computed by summing,
/// over every assignment of eigenmodes to the site-frame operators of both
/// chains, the product of expansion amplitudes, diagonal-operator values and
/// the fermionic sign given by [`sign::resolve`]. Assignments that would
/// create on an occupied mode or destroy on an empty one are pruned as soon
/// as they occur, as are partial assignments that can no longer return to
/// the reference pattern.
///
/// Diagonal operators act relative to the energy of `reference`.
#[derive(Clone, Debug)]
pub struct ChainKet<'a> {
    basis: &'a ModeBasis,
    reference: Occupation,
    weight: C64,
    ops: Vec<Operator<'a>>,
}

impl<'a> ChainKet<'a> {
    /// Create the Fermi sea for the given per-flavor particle counts.
    pub fn filled(basis: &'a ModeBasis, counts: &[usize])
        -> FermionResult<Self>
    {
        basis.fermi_sea(counts)
            .map(|sea| <Self as ManyBodyState<'a>>::from_occupation(basis, sea))
    }

    pub fn basis(&self) -> &'a ModeBasis { self.basis }

    pub fn reference(&self) -> &Occupation { &self.reference }

    pub fn weight(&self) -> C64 { self.weight }

    /// Recorded operators, in application order.
    pub fn ops(&self) -> &[Operator<'a>] { &self.ops }

    /// Number of recorded operators.
    pub fn len(&self) -> usize { self.ops.len() }

    /// Return `true` if no operators have been recorded.
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    /// Multiply the overall weight by `c`.
    pub fn scale(&mut self, c: C64) { self.weight *= c; }

    /// Eigen-frame operators (in application order) that take `from` to
    /// `to`, together with the sign they pick up in doing so.
    fn rebase(&self, from: &Occupation, to: &Occupation)
        -> (Vec<Operator<'a>>, i32)
    {
        let mut ops: Vec<Operator<'a>> = Vec::new();
        let mut occ = from.clone();
        let mut sign: i32 = 1;
        let flavors = from.flavors();
        let kinds = [Kind::Destruction, Kind::Creation];
        for kind in kinds {
            for f in 0..flavors {
                for m in 0..from.modes() {
                    let needs
                        = match kind {
                            Kind::Destruction
                                => from.is_occupied(f, m)
                                && !to.is_occupied(f, m),
                            Kind::Creation
                                => !from.is_occupied(f, m)
                                && to.is_occupied(f, m),
                        };
                    if !needs { continue; }
                    sign *= occ.apply(kind, f, m);
                    ops.push(ModeOperator::eigen(self.basis, kind, m, f).into());
                }
            }
        }
        (ops, sign)
    }

    /// Compute ⟨self|other⟩.
    pub fn scalar_product(&self, other: &Self) -> C64 {
        let bra = self;
        let ket = other;
        if bra.reference.modes() != ket.reference.modes()
            || bra.reference.flavors() != ket.reference.flavors()
        {
            return C64::zero();
        }

        // |bra⟩ = w_b s B S |ket.reference⟩
        let (mut bra_full, rebase_sign) = bra.rebase(&ket.reference, &bra.reference);
        let n_rebase = bra_full.len();
        bra_full.extend(bra.ops.iter().copied());

        let shift = bra.reference.energy(bra.basis) - ket.reference.energy(ket.basis);
        let mut combined: Vec<Operator<'a>> = ket.ops.clone();
        combined.extend(adjoint_product(&bra_full));
        let shifts: Vec<f64>
            = iter::repeat(0.0).take(ket.ops.len())
            .chain(iter::repeat(shift).take(bra.ops.len()))
            .chain(iter::repeat(0.0).take(n_rebase))
            .collect();

        let prefactor
            = bra.weight.conj() * ket.weight * f64::from(rebase_sign);
        if prefactor == C64::zero() { return C64::zero(); }
        prefactor * contract(&ket.reference, &combined, &shifts)
    }
}

/// Depth-first search over eigenmode assignments of a product given in
/// application order, returning `⟨reference| ops |reference⟩`.
fn contract(reference: &Occupation, ops: &[Operator<'_>], shifts: &[f64])
    -> C64
{
    // particle number per flavor must be conserved
    let mut net: Vec<i64> = vec![0; reference.flavors()];
    for op in ops.iter() {
        if let Operator::Mode(op) = op {
            net[op.flavor()] += match op.kind() {
                Kind::Creation => 1,
                Kind::Destruction => -1,
            };
        }
    }
    if net.iter().any(|n| *n != 0) { return C64::zero(); }

    let len = ops.len();
    let mut remaining: Vec<usize> = vec![0; len + 1];
    for k in (0..len).rev() {
        remaining[k] = remaining[k + 1] + usize::from(ops[k].is_mode());
    }
    let candidates: Vec<Vec<(usize, C64)>>
        = ops.iter()
        .map(|op| match op {
            Operator::Mode(op) => op.candidates().collect(),
            Operator::Diagonal(_) => Vec::new(),
        })
        .collect();
    let diags: Vec<(usize, DiagonalOperator<'_>, f64)>
        = ops.iter().zip(shifts).enumerate()
        .filter_map(|(k, (op, shift))| match op {
            Operator::Diagonal(d) => Some((len - 1 - k, *d, *shift)),
            Operator::Mode(_) => None,
        })
        .collect();

    let mut search = Contraction {
        reference,
        ops,
        candidates,
        remaining,
        diags,
        occupation: reference.clone(),
        records: Vec::with_capacity(len),
        leaves: 0,
    };
    let total = search.descend(0, C64::one());
    trace!(ops = len, leaves = search.leaves, "contracted chain");
    total
}

struct Contraction<'c, 'a> {
    reference: &'c Occupation,
    ops: &'c [Operator<'a>],
    candidates: Vec<Vec<(usize, C64)>>,
    remaining: Vec<usize>,
    diags: Vec<(usize, DiagonalOperator<'a>, f64)>,
    occupation: Occupation,
    records: Vec<Record>,
    leaves: usize,
}

impl<'c, 'a> Contraction<'c, 'a> {
    fn descend(&mut self, k: usize, amplitude: C64) -> C64 {
        if k == self.ops.len() { return self.leaf(amplitude); }
        if self.remaining[k] < self.occupation.distance(self.reference) {
            return C64::zero();
        }
        match self.ops[k] {
            Operator::Diagonal(_) => {
                self.records.push(Record::Diagonal);
                let res = self.descend(k + 1, amplitude);
                self.records.pop();
                res
            },
            Operator::Mode(op) => {
                let kind = op.kind();
                let flavor = op.flavor();
                let mut acc = C64::zero();
                for j in 0..self.candidates[k].len() {
                    let (m, a) = self.candidates[k][j];
                    if self.occupation.apply(kind, flavor, m) == 0 { continue; }
                    self.records.push(op.record(m));
                    acc += self.descend(k + 1, amplitude * a);
                    self.records.pop();
                    self.occupation.apply(kind.adjoint(), flavor, m);
                }
                acc
            },
        }
    }

    fn leaf(&mut self, amplitude: C64) -> C64 {
        if self.occupation != *self.reference { return C64::zero(); }
        self.leaves += 1;
        let sign = sign::resolve(&self.records);
        if sign == 0 { return C64::zero(); }
        let written: Vec<Record> = self.records.iter().rev().copied().collect();
        amplitude * f64::from(sign) * diagonal_weight(&written, &self.diags)
    }
}

impl<'a> ManyBodyState<'a> for ChainKet<'a> {
    fn from_occupation(basis: &'a ModeBasis, occupation: Occupation) -> Self {
        debug_assert_eq!(occupation.modes(), basis.len());
        debug_assert_eq!(occupation.flavors(), basis.flavors());
        Self {
            basis,
            reference: occupation,
            weight: C64::one(),
            ops: Vec::new(),
        }
    }

    fn apply(&mut self, op: &Operator<'a>) { self.ops.push(*op); }

    fn scalar_product(&self, other: &Self) -> C64 {
        ChainKet::scalar_product(self, other)
    }
}

#[cfg(test)]
mod tests {
    use ndarray as nd;
    use super::*;
    use crate::{ operators::Frame, states::StateExpansion };

    fn ring(n: usize, flavors: usize) -> ModeBasis {
        let mut H: nd::Array2<C64> = nd::Array2::zeros((n, n));
        let phase = C64::from_polar(1.0, 0.3);
        for i in 0..n {
            let j = (i + 1) % n;
            H[[i, j]] += -phase;
            H[[j, i]] += -phase.conj();
        }
        H[[1, 1]] = C64::from(0.4);
        ModeBasis::from_hopping(H, flavors).unwrap()
    }

    fn site(basis: &ModeBasis, kind: Kind, i: usize, f: usize) -> Operator<'_> {
        ModeOperator::new(basis, kind, Frame::Site, i, f).unwrap().into()
    }

    #[test]
    fn density_matches_expansion() {
        let basis = ring(4, 1);
        let sea = basis.fermi_sea(&[2]).unwrap();
        for i in 0..4 {
            let ops = [
                site(&basis, Kind::Creation, i, 0),
                site(&basis, Kind::Destruction, i, 0),
            ];
            let chain = ChainKet::expectation(&basis, &sea, &ops);
            let expansion = StateExpansion::expectation(&basis, &sea, &ops);
            assert!((chain - expansion).norm() < 1e-10, "{chain} != {expansion}");
        }
    }

    #[test]
    fn dynamical_correlator_matches_expansion() {
        let basis = ring(4, 2);
        let sea = basis.fermi_sea(&[2, 1]).unwrap();
        let ops = [
            site(&basis, Kind::Destruction, 0, 1),
            DiagonalOperator::time_evolution(&basis, 0.7).into(),
            site(&basis, Kind::Creation, 2, 0),
            site(&basis, Kind::Destruction, 3, 0),
            DiagonalOperator::boltzmann(&basis, 0.2).into(),
            site(&basis, Kind::Creation, 1, 1),
        ];
        let chain = ChainKet::expectation(&basis, &sea, &ops);
        let expansion = StateExpansion::expectation(&basis, &sea, &ops);
        assert!((chain - expansion).norm() < 1e-10, "{chain} != {expansion}");
    }

    #[test]
    fn overlap_of_built_states() {
        let basis = ring(3, 1);
        let mut a = ChainKet::filled(&basis, &[1]).unwrap();
        a.apply(&site(&basis, Kind::Creation, 2, 0));
        a.apply(&DiagonalOperator::time_evolution(&basis, 1.1).into());
        let mut b = ChainKet::filled(&basis, &[1]).unwrap();
        b.apply(&site(&basis, Kind::Creation, 0, 0));

        let mut ea = StateExpansion::filled(&basis, &[1]).unwrap();
        ea.apply(&site(&basis, Kind::Creation, 2, 0));
        ea.apply(&DiagonalOperator::time_evolution(&basis, 1.1).into());
        let mut eb = StateExpansion::filled(&basis, &[1]).unwrap();
        eb.apply(&site(&basis, Kind::Creation, 0, 0));

        let chain = a.scalar_product(&b);
        let expansion = ea.scalar_product(&eb);
        assert!((chain - expansion).norm() < 1e-10, "{chain} != {expansion}");
        assert!((b.scalar_product(&a) - chain.conj()).norm() < 1e-12);
    }

    #[test]
    fn different_references_rebase() {
        let basis = ring(3, 1);
        let a_ref = Occupation::from_modes(3, [vec![0, 2]]).unwrap();
        let b_ref = Occupation::from_modes(3, [vec![1]]).unwrap();
        let mut a = ChainKet::from_occupation(&basis, a_ref.clone());
        a.apply(&ModeOperator::mode_destruction(&basis, 0, 0).unwrap().into());
        let mut b = ChainKet::from_occupation(&basis, b_ref.clone());
        b.apply(&ModeOperator::mode_creation(&basis, 2, 0).unwrap().into());

        // c_0 |0,2⟩ = |2⟩ and c†_2 |1⟩ = -|1,2⟩ share nothing
        assert_eq!(a.scalar_product(&b), C64::zero());

        let mut c = ChainKet::from_occupation(&basis, b_ref);
        c.apply(&ModeOperator::mode_destruction(&basis, 1, 0).unwrap().into());
        c.apply(&ModeOperator::mode_creation(&basis, 2, 0).unwrap().into());
        // both are |2⟩ with unit amplitude
        assert!((a.scalar_product(&c) - 1.0).norm() < 1e-14);
    }

    #[test]
    fn rebased_overlap_matches_expansion() {
        let basis = ring(4, 2);
        let a_ref = Occupation::from_modes(4, [vec![0, 1], vec![2]]).unwrap();
        let b_ref = Occupation::from_modes(4, [vec![1, 3], vec![0]]).unwrap();
        let a_ops = [
            site(&basis, Kind::Destruction, 1, 0),
            DiagonalOperator::time_evolution(&basis, 0.6).into(),
            site(&basis, Kind::Creation, 3, 0),
        ];
        let b_ops = [
            site(&basis, Kind::Destruction, 0, 1),
            DiagonalOperator::boltzmann(&basis, 0.2).into(),
            site(&basis, Kind::Creation, 2, 1),
        ];
        let mut a = ChainKet::from_occupation(&basis, a_ref.clone());
        let mut ea = StateExpansion::from_occupation(&basis, a_ref);
        a_ops.iter().for_each(|op| { a.apply(op); ea.apply(op); });
        let mut b = ChainKet::from_occupation(&basis, b_ref.clone());
        let mut eb = StateExpansion::from_occupation(&basis, b_ref);
        b_ops.iter().for_each(|op| { b.apply(op); eb.apply(op); });

        let chain = a.scalar_product(&b);
        let expansion = ea.scalar_product(&eb);
        assert!((chain - expansion).norm() < 1e-10, "{chain} != {expansion}");
        assert!((b.scalar_product(&a) - chain.conj()).norm() < 1e-10);
    }

    #[test]
    fn unbalanced_chain_vanishes() {
        let basis = ring(3, 2);
        let sea = basis.fermi_sea(&[1, 1]).unwrap();
        let ops = [
            site(&basis, Kind::Creation, 0, 0),
            site(&basis, Kind::Destruction, 0, 1),
        ];
        assert_eq!(ChainKet::expectation(&basis, &sea, &ops), C64::zero());
    }

    #[test]
    fn reference_is_normalized() {
        let basis = ring(5, 1);
        let a = ChainKet::filled(&basis, &[3]).unwrap();
        assert_eq!(a.scalar_product(&a), C64::one());
        let mut b = a.clone();
        b.scale(C64::new(0.0, 2.0));
        assert_eq!(a.scalar_product(&b), C64::new(0.0, 2.0));
    }
}
