//! Run configuration loaded from TOML.
//!
//! ```toml
//! [lattice]
//! kind = "chain"        # "chain", "square" or "matrix"
//! sites = 8
//! periodic = true
//! hopping = 1.0
//! flavors = 2
//!
//! [particles]
//! counts = [4, 4]
//!
//! [observable]
//! kind = "green_time"
//! site = 0
//! other = 3
//!
//! [sweep]
//! variable = "time"
//! start = 0.0
//! stop = 10.0
//! num = 101
//! threads = 4
//! strategy = "expansion"
//! ```

use std::{ fs, path::Path, str::FromStr };
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::{
    error::{ FermionError::*, FermionResult },
    hilbert::ModeBasis,
    lattice::Lattice,
    observables::{ Observable, Probe, Strategy },
    sweep::{ Sweep, Variable },
};

fn default_hopping() -> f64 { 1.0 }

fn default_flavors() -> usize { 1 }

/// Lattice geometry selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatticeKind {
    Chain,
    Square,
    Matrix,
}

/// `[lattice]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    pub kind: LatticeKind,
    /// Number of sites of a chain.
    pub sites: Option<usize>,
    /// Extent of a square lattice.
    pub nx: Option<usize>,
    pub ny: Option<usize>,
    #[serde(default)]
    pub periodic: bool,
    /// Explicit one-body matrix, row by row.
    pub matrix: Option<Vec<Vec<f64>>>,
    /// Nearest-neighbor hopping amplitude `t`.
    #[serde(default = "default_hopping")]
    pub hopping: f64,
    #[serde(default = "default_flavors")]
    pub flavors: usize,
}

/// `[particles]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticlesConfig {
    /// Particle number in each flavor.
    pub counts: Vec<usize>,
}

/// `[sweep]` section.
///
/// The grid is either `values` or `start`/`stop`/`num`; the former takes
/// precedence. `time`, `frequency` and `beta` set the probe parameters that
/// are not swept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub variable: Variable,
    pub values: Option<Vec<f64>>,
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub num: Option<usize>,
    pub threads: Option<usize>,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub frequency: f64,
    pub beta: Option<f64>,
}

/// Complete run configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub lattice: LatticeConfig,
    pub particles: ParticlesConfig,
    pub observable: Observable,
    pub sweep: SweepConfig,
}

impl LatticeConfig {
    /// Build the described lattice.
    pub fn lattice(&self) -> FermionResult<Lattice> {
        let missing = |field: &str| {
            InvalidLattice(format!("{:?} lattice requires `{}`", self.kind, field))
        };
        match self.kind {
            LatticeKind::Chain => {
                let sites = self.sites.ok_or_else(|| missing("sites"))?;
                Ok(Lattice::Chain { sites, periodic: self.periodic })
            },
            LatticeKind::Square => {
                let nx = self.nx.ok_or_else(|| missing("nx"))?;
                let ny = self.ny.ok_or_else(|| missing("ny"))?;
                Ok(Lattice::Square { nx, ny, periodic: self.periodic })
            },
            LatticeKind::Matrix => {
                let rows = self.matrix.as_ref().ok_or_else(|| missing("matrix"))?;
                let n = rows.len();
                if let Some(row) = rows.iter().find(|row| row.len() != n) {
                    return Err(NonSquare(n, row.len()));
                }
                let flat: Vec<f64> = rows.iter().flatten().copied().collect();
                nd::Array2::from_shape_vec((n, n), flat)
                    .map(Lattice::Matrix)
                    .map_err(|err| InvalidLattice(err.to_string()))
            },
        }
    }
}

impl SweepConfig {
    /// Build the grid.
    pub fn grid(&self) -> FermionResult<Sweep> {
        match (&self.values, self.start, self.stop, self.num) {
            (Some(values), ..) => Sweep::new(self.variable, values.clone()),
            (None, Some(start), Some(stop), Some(num))
                => Sweep::linspace(self.variable, start, stop, num),
            _ => Err(EmptySweep),
        }
    }

    /// Probe holding the parameters that are not swept.
    pub fn base_probe(&self) -> Probe {
        Probe {
            time: self.time,
            frequency: self.frequency,
            site: None,
            beta: self.beta,
        }
    }
}

impl FromStr for Config {
    type Err = crate::error::FermionError;

    /// Parse and [validate][Config::validate] a configuration.
    fn from_str(s: &str) -> FermionResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Read, parse and [validate][Self::validate] a configuration file.
    pub fn from_file<P>(path: P) -> FermionResult<Self>
    where P: AsRef<Path>
    {
        fs::read_to_string(path)?.parse()
    }

    /// Check everything that can be checked without diagonalizing.
    pub fn validate(&self) -> FermionResult<()> {
        let lattice = self.lattice.lattice()?;
        let modes = lattice.num_sites();
        if modes == 0 {
            return Err(InvalidLattice("lattice has no sites".into()));
        }
        let flavors = self.lattice.flavors;
        if flavors == 0 { return Err(NoFlavors); }

        let counts = &self.particles.counts;
        if counts.len() != flavors {
            return Err(FlavorCountMismatch { expected: flavors, got: counts.len() });
        }
        if let Some((flavor, &count))
            = counts.iter().enumerate().find(|(_, c)| **c > modes)
        {
            return Err(InvalidParticleCount { flavor, count, modes });
        }

        if let Some(required) = self.observable.required_flavors() {
            if required != flavors {
                return Err(ObservableFlavors { required, got: flavors });
            }
        }
        let (sites, obs_flavors) = observable_indices(&self.observable);
        if let Some(&index) = sites.iter().find(|i| **i >= modes) {
            return Err(SiteOutOfRange { index, modes });
        }
        if let Some(&flavor) = obs_flavors.iter().find(|f| **f >= flavors) {
            return Err(FlavorOutOfRange { flavor, flavors });
        }

        let grid = self.sweep.grid()?;
        match grid.variable() {
            Variable::Site => {
                let probe = self.sweep.base_probe();
                let bad
                    = grid.values().iter()
                    .filter_map(|x| grid.probe(&probe, *x).site)
                    .find(|i| *i >= modes);
                if let Some(index) = bad {
                    return Err(SiteOutOfRange { index, modes });
                }
            },
            Variable::Beta => {
                let bad = grid.values().iter().find(|b| b.is_nan() || **b < 0.0);
                if let Some(&beta) = bad { return Err(InvalidBeta(beta)); }
            },
            Variable::Time | Variable::Frequency => { },
        }
        if let Some(beta) = self.sweep.beta {
            if beta.is_nan() || beta < 0.0 { return Err(InvalidBeta(beta)); }
        }
        Ok(())
    }

    /// Build and diagonalize the configured lattice.
    pub fn basis(&self) -> FermionResult<ModeBasis> {
        self.lattice.lattice()?.basis(self.lattice.hopping, self.lattice.flavors)
    }
}

fn observable_indices(obs: &Observable) -> (Vec<usize>, Vec<usize>) {
    match *obs {
        Observable::Density { site, flavor }
            => (vec![site], vec![flavor]),
        Observable::DensityDensity { site, other, flavor, other_flavor }
            => (vec![site, other], vec![flavor, other_flavor]),
        Observable::SpinSpin { site, other }
            => (vec![site, other], vec![]),
        Observable::GreenTime { site, other, flavor }
        | Observable::GreenFrequency { site, other, flavor, .. }
        | Observable::GreenImaginaryTime { site, other, flavor }
            => (vec![site, other], vec![flavor]),
    }
}
