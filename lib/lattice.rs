//! Tight-binding lattices and their one-body hopping matrices.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ FermionError::*, FermionResult },
    hilbert::ModeBasis,
};

/// Geometry of a nearest-neighbor tight-binding model.
///
/// Sites of a [`Self::Square`] lattice are numbered row-major,
/// `i = x + nx * y`.
#[derive(Clone, Debug, PartialEq)]
pub enum Lattice {
    /// One-dimensional chain.
    Chain { sites: usize, periodic: bool },
    /// Two-dimensional square lattice.
    Square { nx: usize, ny: usize, periodic: bool },
    /// Explicit real symmetric one-body matrix, used as-is.
    Matrix(nd::Array2<f64>),
}

/// Append bonds along one periodic-or-open line of `n` sites.
///
/// The wrap-around bond is skipped for `n <= 2`, where it would duplicate
/// an existing bond or connect a site to itself.
fn line_bonds<F>(n: usize, periodic: bool, site: F, bonds: &mut Vec<(usize, usize)>)
where F: Fn(usize) -> usize
{
    (0..n.saturating_sub(1)).for_each(|k| bonds.push((site(k), site(k + 1))));
    if periodic && n > 2 { bonds.push((site(n - 1), site(0))); }
}

impl Lattice {
    /// Number of sites.
    pub fn num_sites(&self) -> usize {
        match self {
            Self::Chain { sites, .. } => *sites,
            Self::Square { nx, ny, .. } => nx * ny,
            Self::Matrix(H) => H.nrows(),
        }
    }

    /// Nearest-neighbor bonds `(i, j)`, each listed once.
    ///
    /// Empty for [`Self::Matrix`].
    pub fn bonds(&self) -> Vec<(usize, usize)> {
        let mut bonds: Vec<(usize, usize)> = Vec::new();
        match self {
            Self::Chain { sites, periodic } => {
                line_bonds(*sites, *periodic, |k| k, &mut bonds);
            },
            Self::Square { nx, ny, periodic } => {
                let (nx, ny) = (*nx, *ny);
                for y in 0..ny {
                    line_bonds(nx, *periodic, |x| x + nx * y, &mut bonds);
                }
                for x in 0..nx {
                    line_bonds(ny, *periodic, |y| x + nx * y, &mut bonds);
                }
            },
            Self::Matrix(_) => { },
        }
        bonds
    }

    /// Build the one-body matrix with amplitude `-t` on every bond.
    ///
    /// For [`Self::Matrix`], `t` is ignored.
    pub fn hopping_matrix(&self, t: f64) -> FermionResult<nd::Array2<C64>> {
        if self.num_sites() == 0 {
            return Err(InvalidLattice("lattice has no sites".into()));
        }
        match self {
            Self::Matrix(H) => {
                let (n, m) = H.dim();
                if n != m { return Err(NonSquare(n, m)); }
                Ok(H.mapv(C64::from))
            },
            _ => {
                let n = self.num_sites();
                let mut H: nd::Array2<C64> = nd::Array2::zeros((n, n));
                for (i, j) in self.bonds() {
                    H[[i, j]] += -t;
                    H[[j, i]] += -t;
                }
                Ok(H)
            },
        }
    }

    /// Build and diagonalize the hopping matrix for `flavors` independent
    /// flavors.
    pub fn basis(&self, t: f64, flavors: usize) -> FermionResult<ModeBasis> {
        ModeBasis::from_hopping(self.hopping_matrix(t)?, flavors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_chain_spectrum() {
        let basis
            = Lattice::Chain { sites: 4, periodic: true }
            .basis(1.0, 1)
            .unwrap();
        let expected = [-2.0, 0.0, 0.0, 2.0];
        basis.energies().iter().zip(expected)
            .for_each(|(e, x)| assert!((e - x).abs() < 1e-10, "{e} != {x}"));
    }

    #[test]
    fn short_periodic_chains_have_no_double_bonds() {
        let two = Lattice::Chain { sites: 2, periodic: true };
        assert_eq!(two.bonds(), vec![(0, 1)]);
        let H = two.hopping_matrix(0.5).unwrap();
        assert_eq!(H[[0, 1]], C64::from(-0.5));
        assert_eq!(H[[0, 0]], C64::from(0.0));
    }

    #[test]
    fn square_bonds() {
        let open = Lattice::Square { nx: 3, ny: 2, periodic: false };
        assert_eq!(open.num_sites(), 6);
        // 2 per row, 1 per column
        assert_eq!(open.bonds().len(), 2 * 2 + 3);
        let torus = Lattice::Square { nx: 3, ny: 3, periodic: true };
        assert_eq!(torus.bonds().len(), 18);
        let H = torus.hopping_matrix(1.0).unwrap();
        H.rows().into_iter()
            .for_each(|row| {
                let deg: f64 = row.iter().map(|h| h.norm()).sum();
                assert_eq!(deg, 4.0);
            });
    }

    #[test]
    fn explicit_matrix_checked() {
        let rect = Lattice::Matrix(nd::Array2::zeros((2, 3)));
        assert!(matches!(rect.hopping_matrix(1.0), Err(NonSquare(2, 3))));
        let empty = Lattice::Chain { sites: 0, periodic: false };
        assert!(matches!(empty.hopping_matrix(1.0), Err(InvalidLattice(_))));
    }
}
