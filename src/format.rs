//! Canonical textual rendering shared by every `Display` impl in the
//! numeric tower: a bare integer or `p/q` for rationals, sign-folded
//! `a + bi` for complex numbers, and bracketed rows for matrices.

use num_traits::{One, Signed, Zero};

use crate::numeric::{Complex, Matrix, MatrixScalar, Radical, Rational};

/// Format a rational as a bare integer when the denominator is 1, or
/// `p/q` otherwise.
#[must_use]
pub fn format_rational(r: &Rational) -> String {
    if r.is_integer() {
        r.numer().to_string()
    } else {
        format!("{}/{}", r.numer(), r.denom())
    }
}

/// Format a complex number with a sign-folded imaginary part: `i`, `-i`,
/// `3i`, `2 + 3i`, `2 - 3i`. A zero imaginary part renders as the bare
/// real part (callers normally avoid this case via `Value::from_complex`).
#[must_use]
pub fn format_complex(c: &Complex) -> String {
    let re_str = format_rational(&c.re);
    if c.im.is_zero() {
        return re_str;
    }
    let im_abs = c.im.abs();
    let im_term = if im_abs.is_one() {
        "i".to_string()
    } else {
        format!("{}i", format_rational(&im_abs))
    };
    if c.re.is_zero() {
        return if c.im.is_negative() {
            format!("-{im_term}")
        } else {
            im_term
        };
    }
    if c.im.is_negative() {
        format!("{re_str} - {im_term}")
    } else {
        format!("{re_str} + {im_term}")
    }
}

/// Format an exact quadratic-irrational value: `a + b*sqrt(d)` with the
/// same sign-folding and coefficient-eliding conventions as
/// `format_complex`, and `i` appended to the radical term when it is the
/// imaginary part of a complex root.
#[must_use]
pub fn format_radical(rad: &Radical) -> String {
    let coeff_abs = rad.coeff.abs();
    let mut term = if coeff_abs.is_one() {
        format!("sqrt({})", rad.radicand)
    } else {
        format!("{}sqrt({})", format_rational(&coeff_abs), rad.radicand)
    };
    if rad.imaginary {
        term.push('i');
    }
    if rad.rational.is_zero() {
        return if rad.coeff.is_negative() {
            format!("-{term}")
        } else {
            term
        };
    }
    let re_str = format_rational(&rad.rational);
    if rad.coeff.is_negative() {
        format!("{re_str} - {term}")
    } else {
        format!("{re_str} + {term}")
    }
}

/// Format a single matrix entry.
#[must_use]
pub fn format_matrix_scalar(s: &MatrixScalar) -> String {
    match s {
        MatrixScalar::Rational(r) => format_rational(r),
        MatrixScalar::Complex(c) => format_complex(c),
    }
}

/// Format a matrix as `[[a,b];[c,d]]`.
#[must_use]
pub fn format_matrix(m: &Matrix) -> String {
    let mut out = String::from("[");
    for r in 0..m.rows() {
        out.push('[');
        for c in 0..m.cols() {
            if c > 0 {
                out.push(',');
            }
            out.push_str(&format_matrix_scalar(&m.data()[r * m.cols() + c]));
        }
        out.push(']');
        if r + 1 < m.rows() {
            out.push(';');
        }
    }
    out.push(']');
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::{format_complex, format_rational};
    use crate::numeric::Complex;
    use num_bigint::BigInt;
    use num_rational::BigRational as Rational;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn integer_rational_has_no_slash() {
        assert_eq!(format_rational(&r(5, 1)), "5");
    }

    #[test]
    fn fractional_rational_shows_p_over_q() {
        assert_eq!(format_rational(&r(3, 4)), "3/4");
    }

    #[test]
    fn bare_imaginary_unit_folds_coefficient() {
        let c = Complex::new(r(0, 1), r(1, 1));
        assert_eq!(format_complex(&c), "i");
    }

    #[test]
    fn negative_imaginary_folds_sign() {
        let c = Complex::new(r(2, 1), r(-3, 1));
        assert_eq!(format_complex(&c), "2 - 3i");
    }

    #[test]
    fn positive_imaginary_keeps_plus() {
        let c = Complex::new(r(2, 1), r(3, 1));
        assert_eq!(format_complex(&c), "2 + 3i");
    }
}
