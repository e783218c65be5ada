//! Exact quadratic-irrational values produced by the solver: `a + b*sqrt(d)`
//! (or, for a complex-conjugate root pair, `a + b*sqrt(d)*i`), kept in closed
//! form instead of collapsed to a decimal approximation.

use std::fmt;

use num_bigint::BigInt;

use super::rational::Rational;

/// `rational + coeff * sqrt(radicand)`, or (if `imaginary`) `rational +
/// coeff * sqrt(radicand) * i`. `radicand` is always a square-free integer
/// greater than 1 and `coeff` is never zero — callers normalise those cases
/// back to a plain `Rational`/`Complex` before constructing this type (see
/// `Value::from_radical`).
#[derive(Debug, Clone, PartialEq)]
pub struct Radical {
    /// The rational part.
    pub rational: Rational,
    /// The coefficient on `sqrt(radicand)`.
    pub coeff: Rational,
    /// A square-free integer greater than 1.
    pub radicand: BigInt,
    /// Whether the radical term is multiplied by the imaginary unit.
    pub imaginary: bool,
}

impl Radical {
    /// Build a `Radical` from its already-normalised components.
    #[must_use]
    pub fn new(rational: Rational, coeff: Rational, radicand: BigInt, imaginary: bool) -> Self {
        Self { rational, coeff, radicand, imaginary }
    }
}

impl fmt::Display for Radical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::format_radical(self))
    }
}
