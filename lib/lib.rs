#![allow(non_snake_case)]

//! Exact correlation functions of non-interacting lattice fermions.
//!
//! A one-body hopping matrix is diagonalized once into a [`ModeBasis`];
//! many-body states are then built from occupation patterns over its
//! eigenmodes, and matrix elements of products of creation, destruction and
//! Hamiltonian-diagonal operators are evaluated combinatorially, either by
//! explicit superposition ([`StateExpansion`]) or by deferred contraction
//! ([`ChainKet`]).

pub mod error;
pub mod hilbert;
pub mod occupation;
pub mod operators;
pub mod sign;
pub mod states;
pub mod ensemble;
pub mod lattice;
pub mod observables;
pub mod sweep;
pub mod config;

pub use error::{ FermionError, FermionResult };
pub use hilbert::ModeBasis;
pub use occupation::Occupation;
pub use operators::{
    DiagonalOperator,
    Diagonal,
    Frame,
    Kind,
    ModeOperator,
    Operator,
    Record,
};
pub use states::{ ChainKet, ManyBodyState, StateExpansion };
pub use ensemble::Ensemble;
pub use lattice::Lattice;
pub use observables::{ Observable, Probe, Strategy };
pub use sweep::{ Row, Sweep, Variable };
pub use config::Config;
