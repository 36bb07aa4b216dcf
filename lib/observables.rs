//! Standard correlation functions expressed as operator products.
//!
//! Every observable here reduces to a short list of `(coefficient, product)`
//! terms, each product given in written order. Pure-state values are taken in
//! a single occupation pattern; thermal values are averaged over a canonical
//! [`Ensemble`].

use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use tracing::trace;
use crate::{
    ensemble::Ensemble,
    error::{ FermionError::*, FermionResult },
    hilbert::ModeBasis,
    occupation::Occupation,
    operators::{ DiagonalOperator, ModeOperator, Operator },
    states::{ ChainKet, ManyBodyState, StateExpansion },
};

/// Which many-body state representation performs the contractions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Explicit superpositions ([`StateExpansion`]).
    #[default]
    Expansion,
    /// Deferred contraction ([`ChainKet`]).
    Chain,
}

fn default_eta() -> f64 { 0.05 }

/// A correlation function between lattice sites.
///
/// `site` is the operator evaluated at the probe time or frequency, `other`
/// the one at time zero.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observable {
    /// ⟨n_{site,flavor}⟩
    Density {
        site: usize,
        #[serde(default)]
        flavor: usize,
    },
    /// ⟨n_{site,flavor}(t) n_{other,other_flavor}⟩
    DensityDensity {
        site: usize,
        other: usize,
        #[serde(default)]
        flavor: usize,
        #[serde(default)]
        other_flavor: usize,
    },
    /// ⟨S^z_site(t) S^z_other⟩ with `S^z = (n_0 - n_1) / 2`; two flavors
    /// only.
    SpinSpin { site: usize, other: usize },
    /// Retarded `-iθ(t) ⟨{c_site(t), c†_other}⟩`.
    GreenTime {
        site: usize,
        other: usize,
        #[serde(default)]
        flavor: usize,
    },
    /// `⟨c_site (z - (H - E_0))⁻¹ c†_other⟩ + ⟨c†_other (z + (H - E_0))⁻¹ c_site⟩`
    /// at `z = ω + iη`.
    GreenFrequency {
        site: usize,
        other: usize,
        #[serde(default)]
        flavor: usize,
        #[serde(default = "default_eta")]
        eta: f64,
    },
    /// Imaginary-time `-⟨c_site(τ) c†_other⟩`.
    GreenImaginaryTime {
        site: usize,
        other: usize,
        #[serde(default)]
        flavor: usize,
    },
}

/// Point at which an [`Observable`] is evaluated.
///
/// `time` doubles as imaginary time τ for
/// [`Observable::GreenImaginaryTime`]. A `site` overrides the observable's
/// own `site`, and a `beta` selects a thermal average over the canonical
/// ensemble instead of the Fermi sea.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Probe {
    pub time: f64,
    pub frequency: f64,
    pub site: Option<usize>,
    pub beta: Option<f64>,
}

impl Probe {
    pub fn at_time(time: f64) -> Self { Self { time, ..Self::default() } }

    pub fn at_frequency(frequency: f64) -> Self {
        Self { frequency, ..Self::default() }
    }

    pub fn with_site(mut self, site: usize) -> Self {
        self.site = Some(site);
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }
}

/// A weighted operator product in written order.
pub type Term<'a> = (C64, Vec<Operator<'a>>);

fn number<'a>(basis: &'a ModeBasis, site: usize, flavor: usize)
    -> FermionResult<[Operator<'a>; 2]>
{
    Ok([
        ModeOperator::creation(basis, site, flavor)?.into(),
        ModeOperator::destruction(basis, site, flavor)?.into(),
    ])
}

impl Observable {
    /// Number of flavors the observable needs, if fixed.
    pub fn required_flavors(&self) -> Option<usize> {
        match self {
            Self::SpinSpin { .. } => Some(2),
            _ => None,
        }
    }

    /// The site probed by the observable.
    pub fn site(&self) -> usize {
        match self {
            Self::Density { site, .. }
            | Self::DensityDensity { site, .. }
            | Self::SpinSpin { site, .. }
            | Self::GreenTime { site, .. }
            | Self::GreenFrequency { site, .. }
            | Self::GreenImaginaryTime { site, .. }
            => *site,
        }
    }

    /// Expand the observable at `probe` into weighted operator products.
    ///
    /// Site and flavor indices are checked against `basis` here.
    pub fn terms<'a>(&self, basis: &'a ModeBasis, probe: &Probe)
        -> FermionResult<Vec<Term<'a>>>
    {
        if let Some(required) = self.required_flavors() {
            if basis.flavors() != required {
                return Err(ObservableFlavors { required, got: basis.flavors() });
            }
        }
        let site = probe.site.unwrap_or(self.site());
        let one = C64::from(1.0);
        let terms: Vec<Term<'a>>
            = match *self {
                Self::Density { flavor, .. } => {
                    vec![(one, number(basis, site, flavor)?.to_vec())]
                },
                Self::DensityDensity { other, flavor, other_flavor, .. } => {
                    let mut ops = number(basis, site, flavor)?.to_vec();
                    ops.push(DiagonalOperator::time_evolution(basis, probe.time).into());
                    ops.extend(number(basis, other, other_flavor)?);
                    vec![(one, ops)]
                },
                Self::SpinSpin { other, .. } => {
                    let spin: [f64; 2] = [1.0, -1.0];
                    let mut terms: Vec<Term<'a>> = Vec::with_capacity(4);
                    for (f, sf) in spin.iter().enumerate() {
                        for (g, sg) in spin.iter().enumerate() {
                            let mut ops = number(basis, site, f)?.to_vec();
                            ops.push(DiagonalOperator::time_evolution(basis, probe.time).into());
                            ops.extend(number(basis, other, g)?);
                            terms.push((C64::from(0.25 * sf * sg), ops));
                        }
                    }
                    terms
                },
                Self::GreenTime { other, flavor, .. } => {
                    let c = ModeOperator::destruction(basis, site, flavor)?;
                    let cdag = ModeOperator::creation(basis, other, flavor)?;
                    if probe.time < 0.0 {
                        Vec::new()
                    } else {
                        let u = DiagonalOperator::time_evolution(basis, probe.time);
                        vec![
                            (-C64::i(), vec![c.into(), u.into(), cdag.into()]),
                            (-C64::i(), vec![cdag.into(), u.transposed().into(), c.into()]),
                        ]
                    }
                },
                Self::GreenFrequency { other, flavor, eta, .. } => {
                    let c = ModeOperator::destruction(basis, site, flavor)?;
                    let cdag = ModeOperator::creation(basis, other, flavor)?;
                    let z = C64::new(probe.frequency, eta);
                    let particle = DiagonalOperator::resolvent(basis, z, 1.0, 0.0);
                    let hole = DiagonalOperator::resolvent(basis, z, -1.0, 0.0);
                    vec![
                        (one, vec![c.into(), particle.into(), cdag.into()]),
                        (one, vec![cdag.into(), hole.into(), c.into()]),
                    ]
                },
                Self::GreenImaginaryTime { other, flavor, .. } => {
                    let c = ModeOperator::destruction(basis, site, flavor)?;
                    let cdag = ModeOperator::creation(basis, other, flavor)?;
                    let b = DiagonalOperator::boltzmann(basis, probe.time);
                    vec![(-one, vec![c.into(), b.into(), cdag.into()])]
                },
            };
        Ok(terms)
    }

    /// Evaluate in a single occupation pattern.
    pub fn pure(
        &self,
        basis: &ModeBasis,
        occupation: &Occupation,
        probe: &Probe,
        strategy: Strategy,
    ) -> FermionResult<C64>
    {
        let terms = self.terms(basis, probe)?;
        Ok(evaluate_terms(basis, occupation, &terms, strategy))
    }

    /// Evaluate in the Fermi sea for `counts`, or, if `probe.beta` is set, in
    /// the canonical ensemble at that inverse temperature.
    pub fn evaluate(
        &self,
        basis: &ModeBasis,
        counts: &[usize],
        probe: &Probe,
        strategy: Strategy,
    ) -> FermionResult<C64>
    {
        let ensemble
            = match probe.beta {
                Some(beta) => Ensemble::canonical(basis, counts, beta)?,
                None => Ensemble::fermi_sea(basis, counts)?,
            };
        self.average(basis, &ensemble, probe, strategy)
    }

    /// Evaluate as a weighted average over a prepared ensemble.
    pub fn average(
        &self,
        basis: &ModeBasis,
        ensemble: &Ensemble,
        probe: &Probe,
        strategy: Strategy,
    ) -> FermionResult<C64>
    {
        let terms = self.terms(basis, probe)?;
        trace!(terms = terms.len(), members = ensemble.len(), "evaluating observable");
        Ok(ensemble.average(|occ| evaluate_terms(basis, occ, &terms, strategy)))
    }
}

/// Sum `c ⟨occupation| ops |occupation⟩` over a list of terms.
pub fn evaluate_terms<'a>(
    basis: &'a ModeBasis,
    occupation: &Occupation,
    terms: &[Term<'a>],
    strategy: Strategy,
) -> C64
{
    match strategy {
        Strategy::Expansion
            => sum_terms::<StateExpansion>(basis, occupation, terms),
        Strategy::Chain
            => sum_terms::<ChainKet>(basis, occupation, terms),
    }
}

fn sum_terms<'a, S>(
    basis: &'a ModeBasis,
    occupation: &Occupation,
    terms: &[Term<'a>],
) -> C64
where S: ManyBodyState<'a>
{
    terms.iter()
        .map(|(c, ops)| *c * S::expectation(basis, occupation, ops))
        .sum()
}
