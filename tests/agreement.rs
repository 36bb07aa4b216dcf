//! The two state representations must give identical matrix elements.

use ndarray as nd;
use num_complex::Complex64 as C64;
use proptest::prelude::*;
use rand::{ Rng, SeedableRng, rngs::StdRng };
use free_fermion_sim::{
    ChainKet,
    DiagonalOperator,
    Frame,
    Kind,
    ManyBodyState,
    ModeBasis,
    ModeOperator,
    Occupation,
    Operator,
    Record,
    StateExpansion,
    sign,
};

fn random_hermitian(n: usize, seed: u64) -> nd::Array2<C64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut H: nd::Array2<C64> = nd::Array2::zeros((n, n));
    for i in 0..n {
        H[[i, i]] = C64::from(rng.gen_range(-1.0..1.0));
        for j in i + 1..n {
            let hij = C64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            H[[i, j]] = hij;
            H[[j, i]] = hij.conj();
        }
    }
    H
}

fn basis(seed: u64) -> ModeBasis {
    ModeBasis::from_hopping(random_hermitian(4, seed), 2).unwrap()
}

#[derive(Copy, Clone, Debug)]
enum Spec {
    Site(bool, usize, usize),
    Evolve(f64),
    Boltzmann(f64),
    Resolvent(f64, f64),
}

fn build<'a>(basis: &'a ModeBasis, specs: &[Spec]) -> Vec<Operator<'a>> {
    specs.iter()
        .map(|spec| match *spec {
            Spec::Site(create, site, flavor) => {
                let kind = if create { Kind::Creation } else { Kind::Destruction };
                ModeOperator::new(basis, kind, Frame::Site, site, flavor)
                    .unwrap()
                    .into()
            },
            Spec::Evolve(t) => DiagonalOperator::time_evolution(basis, t).into(),
            Spec::Boltzmann(b) => DiagonalOperator::boltzmann(basis, b).into(),
            Spec::Resolvent(re, im) => {
                DiagonalOperator::resolvent(basis, C64::new(re, im), 1.0, 0.0)
                    .into()
            },
        })
        .collect()
}

fn spec_strategy() -> impl Strategy<Value = Spec> {
    prop_oneof![
        4 => (any::<bool>(), 0..4_usize, 0..2_usize)
            .prop_map(|(c, s, f)| Spec::Site(c, s, f)),
        1 => (-2.0..2.0_f64).prop_map(Spec::Evolve),
        1 => (0.0..0.3_f64).prop_map(Spec::Boltzmann),
        1 => (-1.0..1.0_f64, 0.2..1.0_f64)
            .prop_map(|(re, im)| Spec::Resolvent(re, im)),
    ]
}

#[test]
fn seeded_correlator_agreement() {
    let basis = basis(7);
    let sea = basis.fermi_sea(&[2, 1]).unwrap();
    let specs = [
        Spec::Site(false, 1, 0),
        Spec::Site(true, 3, 1),
        Spec::Evolve(0.9),
        Spec::Site(false, 0, 1),
        Spec::Resolvent(0.3, 0.4),
        Spec::Site(true, 2, 0),
    ];
    let ops = build(&basis, &specs);
    let a = StateExpansion::expectation(&basis, &sea, &ops);
    let b = ChainKet::expectation(&basis, &sea, &ops);
    assert!((a - b).norm() < 1e-9, "{a} != {b}");
}

#[test]
fn spectrum_and_density_of_open_chain() {
    let mut H: nd::Array2<f64> = nd::Array2::zeros((4, 4));
    for i in 0..3 {
        H[[i, i + 1]] = -1.0;
        H[[i + 1, i]] = -1.0;
    }
    let basis = ModeBasis::from_real_hopping(&H, 1).unwrap();
    let expected = [-1.618034, -0.618034, 0.618034, 1.618034];
    basis.energies().iter().zip(expected)
        .for_each(|(e, x)| assert!((e - x).abs() < 1e-5));
    let sea = basis.fermi_sea(&[2]).unwrap();
    let n0 = [
        ModeOperator::creation(&basis, 0, 0).unwrap().into(),
        ModeOperator::destruction(&basis, 0, 0).unwrap().into(),
    ];
    let a = StateExpansion::expectation(&basis, &sea, &n0);
    let b = ChainKet::expectation(&basis, &sea, &n0);
    assert!((a - 0.5).norm() < 1e-10);
    assert!((b - 0.5).norm() < 1e-10);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn expectation_values_agree(
        seed in 0..1000_u64,
        specs in prop::collection::vec(spec_strategy(), 0..6),
        up in 0..=4_usize,
        down in 0..=4_usize,
    ) {
        let basis = basis(seed);
        let sea = basis.fermi_sea(&[up, down]).unwrap();
        let ops = build(&basis, &specs);
        let a = StateExpansion::expectation(&basis, &sea, &ops);
        let b = ChainKet::expectation(&basis, &sea, &ops);
        prop_assert!((a - b).norm() < 1e-6 * (1.0 + a.norm()), "{} != {}", a, b);
    }

    #[test]
    fn overlaps_agree_and_are_conjugate_symmetric(
        seed in 0..1000_u64,
        left in prop::collection::vec(spec_strategy(), 0..3),
        right in prop::collection::vec(spec_strategy(), 0..3),
    ) {
        let basis = basis(seed);
        let sea = basis.fermi_sea(&[2, 1]).unwrap();
        let mut ea = StateExpansion::from_occupation(&basis, sea.clone());
        let mut eb = ea.clone();
        let mut ca = ChainKet::from_occupation(&basis, sea.clone());
        let mut cb = ca.clone();
        for op in build(&basis, &left).iter() {
            ea.apply(op);
            ca.apply(op);
        }
        for op in build(&basis, &right).iter() {
            eb.apply(op);
            cb.apply(op);
        }
        let e = ea.scalar_product(&eb);
        let c = ca.scalar_product(&cb);
        prop_assert!((e - c).norm() < 1e-6 * (1.0 + e.norm()), "{} != {}", e, c);
        prop_assert!((e - eb.scalar_product(&ea).conj()).norm() < 1e-12);
        prop_assert!((c - cb.scalar_product(&ca).conj()).norm() < 1e-9 * (1.0 + c.norm()));
    }

    #[test]
    fn resolver_matches_concrete_toggling(
        occupied in prop::collection::vec(any::<bool>(), 5),
        toggles in prop::collection::vec(0..5_usize, 0..8),
        closing in Just((0..5_usize).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let reference
            = Occupation::from_modes(
                5,
                [occupied.iter().enumerate().filter(|(_, o)| **o).map(|(m, _)| m)],
            )
            .unwrap();
        let mut occ = reference.clone();
        let mut concrete: i32 = 1;
        let mut history: Vec<Record> = Vec::new();
        let mut toggle = |occ: &mut Occupation, mode: usize| {
            let kind
                = if occ.is_occupied(0, mode) { Kind::Destruction }
                else { Kind::Creation };
            concrete *= occ.apply(kind, 0, mode);
            history.push(Record::Mode { kind, flavor: 0, mode });
        };
        toggles.iter().for_each(|m| toggle(&mut occ, *m));
        for m in closing {
            if occ.is_occupied(0, m) != reference.is_occupied(0, m) {
                toggle(&mut occ, m);
            }
        }
        prop_assert_eq!(&occ, &reference);
        prop_assert_eq!(sign::resolve(&history), concrete);
    }
}
