//! The numeric value tower: exact rationals, complex numbers built from
//! them, and matrices of either.

mod complex;
mod matrix;
mod radical;
pub mod rational;

pub use complex::Complex;
pub use matrix::{Matrix, MatrixScalar};
pub use radical::Radical;
pub use rational::Rational;
