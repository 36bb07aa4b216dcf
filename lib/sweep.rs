//! Parallel evaluation of an observable over a one-dimensional grid.

use std::{
    fmt,
    sync::atomic::{ AtomicUsize, Ordering },
};
use ndarray as nd;
use num_complex::Complex64 as C64;
use rayon::prelude::*;
use serde::{ Deserialize, Serialize };
use tracing::{ debug, info };
use crate::{
    ensemble::Ensemble,
    error::{ FermionError::*, FermionResult },
    hilbert::ModeBasis,
    observables::{ Observable, Probe, Strategy },
};

/// Probe parameter varied over a [`Sweep`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Time,
    Frequency,
    /// Grid values are rounded to the nearest site index.
    Site,
    Beta,
}

/// One evaluated grid point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Row {
    pub index: usize,
    pub x: f64,
    pub value: C64,
}

impl Row {
    /// Real part of the value, provided the imaginary part is within `tol`
    /// of zero.
    pub fn real(&self, tol: f64) -> FermionResult<f64> {
        if self.value.im.abs() > tol { return Err(NonRealResult(self.value.im)); }
        Ok(self.value.re)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.10e} {:+.10e} {:+.10e}", self.x, self.value.re, self.value.im)
    }
}

/// A grid of values for one probe parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Sweep {
    variable: Variable,
    values: Vec<f64>,
}

impl Sweep {
    /// Sweep over explicit values.
    pub fn new(variable: Variable, values: Vec<f64>) -> FermionResult<Self> {
        if values.is_empty() { return Err(EmptySweep); }
        Ok(Self { variable, values })
    }

    /// Sweep over `num` evenly spaced values from `start` to `stop`,
    /// inclusive.
    pub fn linspace(variable: Variable, start: f64, stop: f64, num: usize)
        -> FermionResult<Self>
    {
        Self::new(variable, nd::Array1::linspace(start, stop, num).to_vec())
    }

    /// Sweep over every site of a basis.
    pub fn sites(basis: &ModeBasis) -> FermionResult<Self> {
        Self::new(Variable::Site, (0..basis.len()).map(|i| i as f64).collect())
    }

    pub fn variable(&self) -> Variable { self.variable }

    pub fn values(&self) -> &[f64] { &self.values }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Set the swept parameter of `base` to `x`.
    pub fn probe(&self, base: &Probe, x: f64) -> Probe {
        let mut probe = *base;
        match self.variable {
            Variable::Time => { probe.time = x; },
            Variable::Frequency => { probe.frequency = x; },
            Variable::Site => { probe.site = Some(x.round().max(0.0) as usize); },
            Variable::Beta => { probe.beta = Some(x); },
        }
        probe
    }

    /// Evaluate `observable` at every grid point.
    ///
    /// Points are distributed over a dedicated thread pool with `threads`
    /// workers (rayon's default if `None`). Rows come back in grid order
    /// regardless of completion order. Unless the sweep varies `beta`, the
    /// reference ensemble is built once and shared by all points.
    pub fn run(
        &self,
        basis: &ModeBasis,
        counts: &[usize],
        observable: &Observable,
        base: &Probe,
        strategy: Strategy,
        threads: Option<usize>,
    ) -> FermionResult<Vec<Row>>
    {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = threads { builder = builder.num_threads(n); }
        let pool = builder.build()?;

        let shared: Option<Ensemble>
            = match (self.variable, base.beta) {
                (Variable::Beta, _) => None,
                (_, Some(beta)) => Some(Ensemble::canonical(basis, counts, beta)?),
                (_, None) => Some(Ensemble::fermi_sea(basis, counts)?),
            };

        let total = self.len();
        info!(
            points = total,
            threads = pool.current_num_threads(),
            ?strategy,
            "starting sweep",
        );
        let progress = AtomicUsize::new(0);
        let mut rows: Vec<Row>
            = pool.install(|| {
                self.values.par_iter()
                    .enumerate()
                    .map(|(index, &x)| -> FermionResult<Row> {
                        let probe = self.probe(base, x);
                        let value
                            = match &shared {
                                Some(ens) => observable.average(basis, ens, &probe, strategy)?,
                                None => observable.evaluate(basis, counts, &probe, strategy)?,
                            };
                        let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
                        debug!(index, x, done, total, "evaluated point");
                        Ok(Row { index, x, value })
                    })
                    .collect::<FermionResult<Vec<Row>>>()
            })?;
        rows.sort_by_key(|row| row.index);
        info!(points = rows.len(), "finished sweep");
        Ok(rows)
    }
}
