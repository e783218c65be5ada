//! Exact rational arithmetic.
//!
//! `Rational` is a thin wrapper over [`num_rational::BigRational`], which
//! already maintains the canonical invariant `gcd(p, q) = 1, q > 0` on every
//! operation. This module adds the domain-specific operations the
//! interpreter needs on top: fast integer exponentiation, perfect-square
//! detection, and a bounded float bridge for the transcendental builtins.

use num_bigint::BigInt;
use num_integer::{Integer, Roots};
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::{CoreError, CoreResult};

/// An exact rational number, always stored in lowest terms with a positive
/// denominator.
pub type Rational = BigRational;

/// Maximum denominator used when approximating an inexact float result
/// (e.g. from `sqrt`, `sin`, ...) as a `Rational`. Keeps printed output from
/// growing unboundedly for irrational results.
const MAX_APPROX_DENOMINATOR: u64 = 1_000_000_000;

/// Raise a rational to an integer power using fast exponentiation.
///
/// Negative exponents invert the base first; `base^0 == 1` even for
/// `base == 0` (matching the convention used by the symbolic simplifier,
/// §4.Q). Division by zero (`0^negative`) is reported as a [`CoreError`].
pub fn pow_int(base: &Rational, exp: i64) -> CoreResult<Rational> {
    if exp == 0 {
        return Ok(Rational::from_integer(BigInt::from(1)));
    }
    if base.is_zero() && exp < 0 {
        return Err(CoreError::math("division by zero"));
    }

    let (mut b, mut e) = if exp < 0 {
        (base.recip(), exp.unsigned_abs())
    } else {
        (base.clone(), exp.unsigned_abs())
    };

    let mut result = Rational::from_integer(BigInt::from(1));
    while e > 0 {
        if e & 1 == 1 {
            result *= &b;
        }
        b = &b * &b;
        e >>= 1;
    }
    Ok(result)
}

/// Exact integer square root of a non-negative `BigInt`, if it is a perfect
/// square.
fn exact_isqrt(n: &BigInt) -> Option<BigInt> {
    if n.is_negative() {
        return None;
    }
    if n.is_zero() {
        return Some(BigInt::from(0));
    }
    let root = n.sqrt();
    if &root * &root == *n { Some(root) } else { None }
}

/// Exact square root of a non-negative `Rational`, if both numerator and
/// denominator are perfect squares.
#[must_use]
pub fn exact_sqrt(value: &Rational) -> Option<Rational> {
    if value.is_negative() {
        return None;
    }
    let num_root = exact_isqrt(value.numer())?;
    let den_root = exact_isqrt(value.denom())?;
    Some(Rational::new(num_root, den_root))
}

/// Square-free decomposition of a non-negative `BigInt`: returns
/// `(square_part, square_free_part)` such that
/// `n == square_part * square_part * square_free_part`, with
/// `square_free_part` containing no repeated prime factor. Trial division
/// up to `sqrt(n)`; adequate for the small discriminants a REPL session
/// produces, not meant for cryptographic-size inputs.
fn factor_square_free(n: &BigInt) -> (BigInt, BigInt) {
    if n.is_zero() {
        return (BigInt::from(0), BigInt::from(1));
    }
    let mut remaining = n.clone();
    let mut square_part = BigInt::from(1);
    let mut square_free = BigInt::from(1);
    let mut divisor = BigInt::from(2);
    while &divisor * &divisor <= remaining {
        if (&remaining % &divisor).is_zero() {
            let mut exponent: u32 = 0;
            while (&remaining % &divisor).is_zero() {
                remaining /= &divisor;
                exponent += 1;
            }
            for _ in 0..exponent / 2 {
                square_part *= &divisor;
            }
            if exponent % 2 == 1 {
                square_free *= &divisor;
            }
        }
        divisor += BigInt::from(1);
    }
    square_free *= &remaining;
    (square_part, square_free)
}

/// Exact square-free form of `sqrt(value)` for a non-negative `Rational`:
/// returns `(coeff, radicand)` such that `sqrt(value) == coeff *
/// sqrt(radicand)`, with `radicand` a square-free positive integer.
/// `radicand == 1` means the square root is exact, equal to `coeff`.
#[must_use]
pub fn sqrt_radical(value: &Rational) -> (Rational, BigInt) {
    if value.is_zero() {
        return (Rational::from_integer(BigInt::from(0)), BigInt::from(1));
    }
    let product = value.numer() * value.denom();
    let (square_part, square_free) = factor_square_free(&product);
    let coeff = Rational::new(square_part, value.denom().clone());
    (coeff, square_free)
}

/// Euclidean remainder on two integer-valued rationals (spec §4.P: `%` is
/// only defined on integers).
pub fn euclidean_rem(lhs: &Rational, rhs: &Rational) -> CoreResult<Rational> {
    if !lhs.is_integer() || !rhs.is_integer() {
        return Err(CoreError::type_err(
            "'%' is only defined on integer operands",
        ));
    }
    if rhs.is_zero() {
        return Err(CoreError::math("division by zero"));
    }
    let a = lhs.numer();
    let b = rhs.numer();
    let rem = a.mod_floor(b);
    // mod_floor can return a value with the sign of `b`; Euclidean
    // remainder is always non-negative.
    let rem = if rem.is_negative() { rem + b.abs() } else { rem };
    Ok(Rational::from_integer(rem))
}

/// Convert a `Rational` to `f64` for use at a builtin's domain boundary.
#[must_use]
pub fn to_f64(value: &Rational) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Approximate an `f64` (the result of a transcendental builtin) as a
/// `Rational`, bounding the denominator so printed output stays readable.
#[must_use]
pub fn from_f64_approx(x: f64) -> Rational {
    if !x.is_finite() {
        return Rational::from_integer(BigInt::from(0));
    }
    if let Some(exact) = Rational::from_float(x) {
        if exact.denom() <= &BigInt::from(MAX_APPROX_DENOMINATOR) {
            return exact;
        }
    }
    continued_fraction_approx(x, MAX_APPROX_DENOMINATOR)
}

/// Best rational approximation of `x` with denominator `<= max_denom`,
/// via the standard continued-fraction convergent algorithm.
fn continued_fraction_approx(x: f64, max_denom: u64) -> Rational {
    let sign = if x < 0.0 { -1i64 } else { 1i64 };
    let mut x = x.abs();

    let (mut h_prev, mut h_curr) = (0i64, 1i64);
    let (mut k_prev, mut k_curr) = (1i64, 0i64);

    loop {
        let a = x.floor();
        let a_int = a as i64;
        let h_next = a_int
            .checked_mul(h_curr)
            .and_then(|v| v.checked_add(h_prev));
        let k_next = a_int
            .checked_mul(k_curr)
            .and_then(|v| v.checked_add(k_prev));
        let (Some(h_next), Some(k_next)) = (h_next, k_next) else {
            break;
        };
        if k_next as u64 > max_denom || k_next == 0 {
            break;
        }
        h_prev = h_curr;
        h_curr = h_next;
        k_prev = k_curr;
        k_curr = k_next;

        let frac = x - a;
        if frac.abs() < 1e-15 {
            break;
        }
        x = 1.0 / frac;
        if !x.is_finite() {
            break;
        }
    }

    if k_curr == 0 {
        return Rational::from_integer(BigInt::from(0));
    }
    Rational::new(BigInt::from(sign * h_curr), BigInt::from(k_curr))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::{euclidean_rem, exact_sqrt, from_f64_approx, pow_int, sqrt_radical};
    use num_bigint::BigInt;
    use num_rational::BigRational as Rational;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn pow_int_basic() {
        assert_eq!(pow_int(&r(2, 1), 10).unwrap(), r(1024, 1));
        assert_eq!(pow_int(&r(2, 1), 0).unwrap(), r(1, 1));
        assert_eq!(pow_int(&r(2, 1), -1).unwrap(), r(1, 2));
    }

    #[test]
    fn pow_int_zero_to_negative_is_error() {
        assert!(pow_int(&r(0, 1), -1).is_err());
    }

    #[test]
    fn exact_sqrt_perfect_square() {
        assert_eq!(exact_sqrt(&r(4, 1)), Some(r(2, 1)));
        assert_eq!(exact_sqrt(&r(9, 4)), Some(r(3, 2)));
        assert_eq!(exact_sqrt(&r(2, 1)), None);
        assert_eq!(exact_sqrt(&r(-4, 1)), None);
    }

    #[test]
    fn sqrt_radical_of_perfect_square_is_exact() {
        let (coeff, radicand) = sqrt_radical(&r(9, 1));
        assert_eq!(coeff, r(3, 1));
        assert_eq!(radicand, BigInt::from(1));
    }

    #[test]
    fn sqrt_radical_extracts_square_factor() {
        // sqrt(8) == 2*sqrt(2)
        let (coeff, radicand) = sqrt_radical(&r(8, 1));
        assert_eq!(coeff, r(2, 1));
        assert_eq!(radicand, BigInt::from(2));
    }

    #[test]
    fn sqrt_radical_handles_fractions() {
        // sqrt(2/9) == (1/3)*sqrt(2)
        let (coeff, radicand) = sqrt_radical(&r(2, 9));
        assert_eq!(coeff, r(1, 3));
        assert_eq!(radicand, BigInt::from(2));
    }

    #[test]
    fn euclidean_rem_basic() {
        assert_eq!(euclidean_rem(&r(7, 1), &r(3, 1)).unwrap(), r(1, 1));
        assert_eq!(euclidean_rem(&r(-7, 1), &r(3, 1)).unwrap(), r(2, 1));
    }

    #[test]
    fn euclidean_rem_rejects_non_integers() {
        assert!(euclidean_rem(&r(7, 2), &r(3, 1)).is_err());
    }

    #[test]
    fn from_f64_approx_roundtrips_exact_values() {
        assert_eq!(from_f64_approx(0.5), r(1, 2));
    }
}
