//! Canonical symbolic polynomial representation.
//!
//! A [`PolyExpr`] is a sum of monomials, each a product of distinct
//! variables raised to positive integer powers, with a scalar coefficient.
//! The representation is kept canonical at every step: no zero
//! coefficients are ever stored, and a monomial's variable list is sorted
//! and de-duplicated. Two `PolyExpr`s that are mathematically equal always
//! compare `==` and print identically.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use num_traits::Zero;

use crate::error::{CoreError, CoreResult};
use crate::numeric::{Complex, Rational};

/// A monomial's variable part: `(name, exponent)` pairs, sorted by name,
/// each exponent strictly positive, each name appearing at most once.
pub type MonomialKey = Vec<(String, u32)>;

/// A scalar coefficient: exact rational or complex, matching the numeric
/// tower used for evaluated values.
#[derive(Debug, Clone, PartialEq)]
pub enum Coeff {
    /// An exact rational coefficient.
    Rational(Rational),
    /// An exact complex coefficient.
    Complex(Complex),
}

impl Coeff {
    fn is_zero(&self) -> bool {
        match self {
            Self::Rational(r) => r.is_zero(),
            Self::Complex(c) => c.re.is_zero() && c.im.is_zero(),
        }
    }

    fn as_complex(&self) -> Complex {
        match self {
            Self::Rational(r) => Complex::new(r.clone(), Rational::from_integer(0.into())),
            Self::Complex(c) => c.clone(),
        }
    }

    /// Collapse a `Complex` coefficient with zero imaginary part back to
    /// `Rational`, mirroring `Value::from_complex`.
    fn normalize(self) -> Self {
        match self {
            Self::Complex(c) if c.is_real() => Self::Rational(c.re),
            other => other,
        }
    }

    fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Rational(a), Self::Rational(b)) => Self::Rational(a + b),
            _ => Self::Complex(self.as_complex().add(&other.as_complex())),
        }
        .normalize()
    }

    fn neg(&self) -> Self {
        match self {
            Self::Rational(r) => Self::Rational(-r),
            Self::Complex(c) => Self::Complex(c.neg()),
        }
    }

    fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Rational(a), Self::Rational(b)) => Self::Rational(a * b),
            _ => Self::Complex(self.as_complex().mul(&other.as_complex())),
        }
        .normalize()
    }

    fn one() -> Self {
        Self::Rational(Rational::from_integer(1.into()))
    }
}

impl fmt::Display for Coeff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rational(r) => write!(f, "{}", crate::format::format_rational(r)),
            Self::Complex(c) => write!(f, "{}", crate::format::format_complex(c)),
        }
    }
}

/// A symbolic polynomial: a map from canonical monomial key to non-zero
/// coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyExpr {
    terms: BTreeMap<MonomialKey, Coeff>,
}

fn canonicalize_key(mut key: MonomialKey) -> MonomialKey {
    key.retain(|(_, exp)| *exp != 0);
    key.sort_by(|a, b| a.0.cmp(&b.0));
    key
}

fn total_degree(key: &MonomialKey) -> u32 {
    key.iter().map(|(_, e)| e).sum()
}

impl PolyExpr {
    /// The zero polynomial.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            terms: BTreeMap::new(),
        }
    }

    /// A constant polynomial.
    #[must_use]
    pub fn constant(coeff: Coeff) -> Self {
        let mut p = Self::zero();
        p.insert_term(Vec::new(), coeff);
        p
    }

    /// The polynomial `x` for a single variable `name`.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        let mut p = Self::zero();
        p.insert_term(vec![(name.into(), 1)], Coeff::one());
        p
    }

    /// `true` if this polynomial is the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// If this polynomial is a bare constant (including zero), return its
    /// coefficient.
    #[must_use]
    pub fn as_constant(&self) -> Option<&Coeff> {
        if self.terms.is_empty() {
            return None; // caller should treat missing entry as zero
        }
        match self.terms.len() {
            1 => {
                let (key, coeff) = self.terms.iter().next().expect("checked len == 1");
                if key.is_empty() {
                    Some(coeff)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// The distinct variable names appearing anywhere in this polynomial,
    /// sorted.
    #[must_use]
    pub fn free_vars(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .terms
            .keys()
            .flat_map(|key| key.iter().map(|(n, _)| n.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn insert_term(&mut self, key: MonomialKey, coeff: Coeff) {
        let key = canonicalize_key(key);
        if coeff.is_zero() {
            self.terms.remove(&key);
            return;
        }
        let combined = match self.terms.remove(&key) {
            Some(existing) => existing.add(&coeff),
            None => coeff,
        };
        if !combined.is_zero() {
            self.terms.insert(key, combined);
        }
    }

    /// Add two polynomials.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (key, coeff) in &other.terms {
            result.insert_term(key.clone(), coeff.clone());
        }
        result
    }

    /// Subtract `other` from `self`.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Negate a polynomial.
    #[must_use]
    pub fn neg(&self) -> Self {
        let terms = self
            .terms
            .iter()
            .map(|(k, c)| (k.clone(), c.neg()))
            .collect();
        Self { terms }
    }

    /// Multiply two polynomials (full convolution of terms).
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let mut result = Self::zero();
        for (k1, c1) in &self.terms {
            for (k2, c2) in &other.terms {
                let mut merged = k1.clone();
                merged.extend(k2.iter().cloned());
                let merged = merge_exponents(merged);
                result.insert_term(merged, c1.mul(c2));
            }
        }
        result
    }

    /// Multiply by a scalar coefficient.
    #[must_use]
    pub fn scalar_mul(&self, scalar: &Coeff) -> Self {
        let terms = self
            .terms
            .iter()
            .filter_map(|(k, c)| {
                let product = c.mul(scalar);
                (!product.is_zero()).then(|| (k.clone(), product))
            })
            .collect();
        Self { terms }
    }

    /// Raise to a non-negative integer power by repeated squaring.
    /// Negative exponents are a domain error: symbolic polynomials have no
    /// general multiplicative inverse.
    pub fn pow_int(&self, exp: i64) -> CoreResult<Self> {
        if exp < 0 {
            return Err(CoreError::type_err(
                "symbolic expressions cannot be raised to a negative power",
            ));
        }
        let mut result = Self::constant(Coeff::one());
        let mut base = self.clone();
        let mut e = exp as u64;
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            e >>= 1;
        }
        Ok(result)
    }

    /// The coefficient of a specific monomial degree for a single-variable
    /// polynomial, used by the equation solver to extract `a*x^2 + b*x + c`
    /// coefficients. Returns zero if the variable doesn't reach `degree`.
    #[must_use]
    pub fn coeff_of_degree(&self, var: &str, degree: u32) -> Coeff {
        for (key, coeff) in &self.terms {
            let matches_degree = if degree == 0 {
                key.is_empty()
            } else {
                key.len() == 1 && key[0].0 == var && key[0].1 == degree
            };
            if matches_degree {
                return coeff.clone();
            }
        }
        Coeff::Rational(Rational::from_integer(0.into()))
    }

    /// The highest total degree appearing, or 0 for the zero polynomial.
    #[must_use]
    pub fn degree(&self) -> u32 {
        self.terms.keys().map(total_degree).max().unwrap_or(0)
    }
}

fn merge_exponents(mut key: MonomialKey) -> MonomialKey {
    key.sort_by(|a, b| a.0.cmp(&b.0));
    let mut merged: MonomialKey = Vec::with_capacity(key.len());
    for (name, exp) in key.drain(..) {
        if let Some(last) = merged.last_mut() {
            if last.0 == name {
                last.1 += exp;
                continue;
            }
        }
        merged.push((name, exp));
    }
    merged
}

/// Order terms for display: descending total degree, then lexicographic by
/// the monomial's variable sequence.
fn term_order(a: &MonomialKey, b: &MonomialKey) -> Ordering {
    total_degree(b)
        .cmp(&total_degree(a))
        .then_with(|| a.cmp(b))
}

impl fmt::Display for PolyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        let mut keys: Vec<&MonomialKey> = self.terms.keys().collect();
        keys.sort_by(|a, b| term_order(a, b));

        let mut first = true;
        for key in keys {
            let coeff = &self.terms[key];
            let monomial = format_monomial(key);
            write_term(f, coeff, &monomial, first)?;
            first = false;
        }
        Ok(())
    }
}

fn format_monomial(key: &MonomialKey) -> String {
    key.iter()
        .map(|(name, exp)| {
            if *exp == 1 {
                name.clone()
            } else {
                format!("{name}^{exp}")
            }
        })
        .collect::<Vec<_>>()
        .join(" * ")
}

fn write_term(f: &mut fmt::Formatter<'_>, coeff: &Coeff, monomial: &str, first: bool) -> fmt::Result {
    if monomial.is_empty() {
        if !first {
            write!(f, " + ")?;
        }
        return write!(f, "{coeff}");
    }
    let one = Coeff::one();
    let neg_one = one.neg();
    if !first {
        write!(f, " + ")?;
    }
    if *coeff == one {
        write!(f, "{monomial}")
    } else if *coeff == neg_one {
        write!(f, "-{monomial}")
    } else {
        write!(f, "{coeff} * {monomial}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::{Coeff, PolyExpr};
    use num_bigint::BigInt;
    use num_rational::BigRational as Rational;

    fn r(n: i64) -> Coeff {
        Coeff::Rational(Rational::from_integer(BigInt::from(n)))
    }

    #[test]
    fn constant_plus_constant() {
        let a = PolyExpr::constant(r(3));
        let b = PolyExpr::constant(r(4));
        let sum = a.add(&b);
        assert_eq!(sum.as_constant(), Some(&r(7)));
    }

    #[test]
    fn variable_squared_expands_correctly() {
        let x = PolyExpr::variable("x");
        let x2 = x.mul(&x);
        assert_eq!(x2.coeff_of_degree("x", 2), r(1));
        assert_eq!(x2.degree(), 2);
    }

    #[test]
    fn x_plus_one_squared_matches_binomial() {
        let x = PolyExpr::variable("x");
        let one = PolyExpr::constant(r(1));
        let expanded = x.add(&one).pow_int(2).unwrap();
        assert_eq!(expanded.coeff_of_degree("x", 2), r(1));
        assert_eq!(expanded.coeff_of_degree("x", 1), r(2));
        assert_eq!(expanded.coeff_of_degree("x", 0), r(1));
    }

    #[test]
    fn display_orders_by_descending_degree() {
        let x = PolyExpr::variable("x");
        let one = PolyExpr::constant(r(1));
        let p = x.mul(&x).add(&x).add(&one);
        assert_eq!(p.to_string(), "x^2 + x + 1");
    }

    #[test]
    fn zero_polynomial_is_additive_identity() {
        let x = PolyExpr::variable("x");
        assert_eq!(x.add(&PolyExpr::zero()), x);
    }

    #[test]
    fn negative_power_is_rejected() {
        let x = PolyExpr::variable("x");
        assert!(x.pow_int(-1).is_err());
    }

    fn binomial(n: u64, k: u64) -> u64 {
        if k > n {
            return 0;
        }
        let k = k.min(n - k);
        let mut result = 1u64;
        for i in 0..k {
            result = result * (n - i) / (i + 1);
        }
        result
    }

    // (x+1)^n expanded through the general multiplication path must match
    // Pascal's triangle for every coefficient, not just the cases the
    // hand-written tests above happen to exercise.
    quickcheck::quickcheck! {
        fn binomial_expansion_matches_pascals_triangle(n: u8) -> bool {
            let n = u64::from(n % 8);
            let x = PolyExpr::variable("x");
            let one = PolyExpr::constant(r(1));
            let expanded = x.add(&one).pow_int(n as i64).unwrap();
            (0..=n).all(|k| {
                let expected = binomial(n, k);
                expanded.coeff_of_degree("x", k as u32) == r(expected as i64)
            })
        }
    }
}
