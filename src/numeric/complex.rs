//! Exact complex arithmetic built on [`Rational`] components.

use std::fmt;

use num_traits::{Signed, Zero};

use super::rational::{self, Rational};
use crate::error::{CoreError, CoreResult};

/// A complex number with exact rational real and imaginary parts.
///
/// Unlike [`num_complex::Complex`], this type is never constructed with a
/// zero imaginary part by the evaluator: every operation collapses back to
/// a plain `Rational` (via `Value::from_complex`) the moment `im` becomes
/// zero, per the data-model invariant that `Value::Complex` always has
/// `im != 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complex {
    /// Real part.
    pub re: Rational,
    /// Imaginary part.
    pub im: Rational,
}

impl Complex {
    /// Construct a complex number from its components.
    #[must_use]
    pub fn new(re: Rational, im: Rational) -> Self {
        Self { re, im }
    }

    /// The imaginary unit `i`.
    #[must_use]
    pub fn i() -> Self {
        Self::new(Rational::from_integer(0.into()), Rational::from_integer(1.into()))
    }

    /// `true` if the imaginary part is zero (callers should collapse to a
    /// bare `Rational` in this case; this type itself does not enforce it
    /// so intermediate arithmetic can stay in `Complex` form).
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.im.is_zero()
    }

    /// Add two complex numbers componentwise.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self::new(&self.re + &other.re, &self.im + &other.im)
    }

    /// Subtract two complex numbers componentwise.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(&self.re - &other.re, &self.im - &other.im)
    }

    /// Negate a complex number.
    #[must_use]
    pub fn neg(&self) -> Self {
        Self::new(-&self.re, -&self.im)
    }

    /// Multiply two complex numbers using the Gauss three-multiply
    /// identity, preserving exactness without an extra multiplication:
    /// `k1 = c*(a+b)`, `k2 = a*(d-c)`, `k3 = b*(c+d)`,
    /// `re = k1 - k3`, `im = k1 + k2`, for `(a+bi)(c+di)`.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let (a, b) = (&self.re, &self.im);
        let (c, d) = (&other.re, &other.im);
        let k1 = c * (a + b);
        let k2 = a * (d - c);
        let k3 = b * (c + d);
        Self::new(&k1 - &k3, k1 + k2)
    }

    /// Squared norm `re^2 + im^2`.
    #[must_use]
    pub fn norm_sq(&self) -> Rational {
        &self.re * &self.re + &self.im * &self.im
    }

    /// Complex conjugate.
    #[must_use]
    pub fn conj(&self) -> Self {
        Self::new(self.re.clone(), -&self.im)
    }

    /// Divide two complex numbers via the conjugate-over-norm identity.
    pub fn div(&self, other: &Self) -> CoreResult<Self> {
        let denom = other.norm_sq();
        if denom.is_zero() {
            return Err(CoreError::math("division by zero"));
        }
        let numer = self.mul(&other.conj());
        Ok(Self::new(&numer.re / &denom, &numer.im / &denom))
    }

    /// Raise to a non-negative integer power by repeated squaring, or a
    /// negative integer power via conjugate-over-norm inversion first.
    pub fn pow_int(&self, exp: i64) -> CoreResult<Self> {
        if exp == 0 {
            return Ok(Self::new(Rational::from_integer(1.into()), Rational::from_integer(0.into())));
        }
        let (mut base, mut e) = if exp < 0 {
            (self.inv()?, exp.unsigned_abs())
        } else {
            (self.clone(), exp.unsigned_abs())
        };
        let mut result = Self::new(Rational::from_integer(1.into()), Rational::from_integer(0.into()));
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            e >>= 1;
        }
        Ok(result)
    }

    /// Multiplicative inverse (conjugate over squared norm).
    pub fn inv(&self) -> CoreResult<Self> {
        let denom = self.norm_sq();
        if denom.is_zero() {
            return Err(CoreError::math("division by zero"));
        }
        let conj = self.conj();
        Ok(Self::new(&conj.re / &denom, &conj.im / &denom))
    }

    /// Absolute value `sqrt(re^2 + im^2)`, promoted through the `f64`
    /// builtin bridge (exact only when the norm is a perfect square).
    #[must_use]
    pub fn abs(&self) -> Rational {
        let norm_sq = self.norm_sq();
        rational::exact_sqrt(&norm_sq)
            .unwrap_or_else(|| rational::from_f64_approx(rational::to_f64(&norm_sq).sqrt()))
    }

    /// Principal square root: `sqrt(r * e^{i*theta}) = sqrt(r) * e^{i*theta/2}`,
    /// `theta` in `(-pi, pi]`, via the half-angle identity so the result
    /// stays in terms of the original rational components where possible:
    /// `re(sqrt(z)) = sqrt((|z| + re(z)) / 2)`,
    /// `im(sqrt(z)) = sign(im(z)) * sqrt((|z| - re(z)) / 2)`.
    #[must_use]
    pub fn principal_sqrt(&self) -> Self {
        let modulus = self.abs();
        let half_re_sq = (&modulus + &self.re) / Rational::from_integer(2.into());
        let half_im_sq = (&modulus - &self.re) / Rational::from_integer(2.into());
        let re = sqrt_nonneg(&half_re_sq);
        let mut im = sqrt_nonneg(&half_im_sq);
        if self.im.is_negative() {
            im = -im;
        }
        Self::new(re, im)
    }
}

/// Square root of a non-negative rational, exact if possible.
fn sqrt_nonneg(value: &Rational) -> Rational {
    if value.is_negative() {
        return Rational::from_integer(0.into());
    }
    rational::exact_sqrt(value)
        .unwrap_or_else(|| rational::from_f64_approx(rational::to_f64(value).sqrt()))
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::format_complex(self))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::Complex;
    use num_bigint::BigInt;
    use num_rational::BigRational as Rational;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(BigInt::from(n), BigInt::from(d))
    }

    fn c(re: i64, im: i64) -> Complex {
        Complex::new(r(re, 1), r(im, 1))
    }

    #[test]
    fn i_squared_is_minus_one() {
        let i = Complex::i();
        let sq = i.mul(&i);
        assert_eq!(sq, c(-1, 0));
    }

    #[test]
    fn addition_and_subtraction() {
        assert_eq!(c(3, 2).add(&c(1, 4)), c(4, 6));
        assert_eq!(c(3, 2).sub(&c(1, 4)), c(2, -2));
    }

    #[test]
    fn multiplication_matches_foil() {
        // (1+2i)(3+4i) = 3 + 4i + 6i + 8i^2 = -5 + 10i
        assert_eq!(c(1, 2).mul(&c(3, 4)), c(-5, 10));
    }

    #[test]
    fn division_by_self_is_one() {
        let z = c(3, 4);
        let result = z.div(&z).unwrap();
        assert_eq!(result, c(1, 0));
    }

    #[test]
    fn pow_int_repeated_squaring() {
        let i = Complex::i();
        assert_eq!(i.pow_int(4).unwrap(), c(1, 0));
        assert_eq!(i.pow_int(2).unwrap(), c(-1, 0));
    }
}
