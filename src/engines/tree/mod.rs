//! Lattice engines.

pub mod binomial;

pub use binomial::BinomialTreeEngine;
