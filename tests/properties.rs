use num_complex::Complex64 as C64;
use proptest::prelude::*;
use free_fermion_sim::{
    DiagonalOperator,
    Kind,
    Lattice,
    ManyBodyState,
    ModeOperator,
    Occupation,
    StateExpansion,
};

fn pattern(modes: usize, flavors: usize)
    -> impl Strategy<Value = Occupation>
{
    prop::collection::vec(prop::collection::vec(any::<bool>(), modes), flavors)
        .prop_map(move |bits| {
            let lists: Vec<Vec<usize>>
                = bits.iter()
                .map(|row| {
                    row.iter().enumerate()
                        .filter(|(_, b)| **b)
                        .map(|(m, _)| m)
                        .collect()
                })
                .collect();
            Occupation::from_modes(modes, lists).unwrap()
        })
}

proptest! {
    #[test]
    fn pauli_exclusion(occ in pattern(70, 2), flavor in 0..2_usize, mode in 0..70_usize) {
        let mut occ = occ;
        if occ.is_occupied(flavor, mode) {
            let before = occ.clone();
            prop_assert_eq!(occ.apply(Kind::Creation, flavor, mode), 0);
            prop_assert_eq!(&occ, &before);
        } else {
            prop_assert_ne!(occ.apply(Kind::Creation, flavor, mode), 0);
            prop_assert_eq!(occ.apply(Kind::Creation, flavor, mode), 0);
        }
    }

    #[test]
    fn toggle_round_trip(
        occ in pattern(9, 3),
        flavor in 0..3_usize,
        mode in 0..9_usize,
    ) {
        let mut toggled = occ.clone();
        let kind
            = if occ.is_occupied(flavor, mode) { Kind::Destruction }
            else { Kind::Creation };
        let there = toggled.apply(kind, flavor, mode);
        let back = toggled.apply(kind.adjoint(), flavor, mode);
        prop_assert_eq!(&toggled, &occ);
        prop_assert_eq!(there * back, 1);
        prop_assert_eq!(occ.distance(&toggled), 0);
    }

    #[test]
    fn creation_operators_anticommute(
        occ in pattern(6, 2),
        a in (0..2_usize, 0..6_usize),
        b in (0..2_usize, 0..6_usize),
    ) {
        prop_assume!(a != b);
        let mut ab = occ.clone();
        let s_ab = ab.apply(Kind::Creation, b.0, b.1) * ab.apply(Kind::Creation, a.0, a.1);
        let mut ba = occ.clone();
        let s_ba = ba.apply(Kind::Creation, a.0, a.1) * ba.apply(Kind::Creation, b.0, b.1);
        prop_assert_eq!(s_ab, -s_ba);
        if s_ab != 0 { prop_assert_eq!(&ab, &ba); }
    }

    #[test]
    fn evolution_is_unitary_and_simplify_idempotent(
        t in -10.0..10.0_f64,
        site in 0..6_usize,
        count in 1..5_usize,
    ) {
        let basis = Lattice::Chain { sites: 6, periodic: true }.basis(1.0, 1).unwrap();
        let mut psi = StateExpansion::filled(&basis, &[count]).unwrap();
        psi.apply(&ModeOperator::destruction(&basis, site, 0).unwrap().into());
        psi.apply(&ModeOperator::creation(&basis, (site + 2) % 6, 0).unwrap().into());
        psi.simplify();
        let norm = psi.norm_sqr();
        psi.apply(&DiagonalOperator::time_evolution(&basis, t).into());
        psi.simplify();
        prop_assert!((psi.norm_sqr() - norm).abs() < 1e-9);
        let mut again = StateExpansion::new(&basis);
        again.add(&psi);
        prop_assert!(!again.is_simplified());
        again.simplify();
        prop_assert_eq!(again.terms(), psi.terms());
        let overlap: C64 = psi.scalar_product(&psi);
        prop_assert!(overlap.im.abs() < 1e-12);
    }
}
