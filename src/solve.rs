//! Degree <= 2 single-variable equation solving.
//!
//! A query `lhs = rhs ?` is reduced to `lhs - rhs = 0`, evaluated to a
//! canonical [`PolyExpr`], and classified by degree in its one free
//! variable. Higher degree, or more than one free variable, is a
//! [`CoreError::SolveError`] rather than a silent approximation.

use crate::ast::Expr;
use crate::error::{CoreError, CoreResult};
use crate::eval;
use crate::numeric::Complex;
use crate::poly::Coeff;
use crate::value::{Environment, Value};

/// The shape of a solved equation's root set.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveResult {
    /// `0 = 0`: every value of the variable satisfies the equation.
    Identity,
    /// A non-zero constant equals zero: no value satisfies the equation.
    Contradiction,
    /// Exactly one root (degree 1, or a degree-2 equation with `a == 0`).
    Linear(Value),
    /// A degree-2 equation with a positive real discriminant: two distinct
    /// real roots.
    TwoReal(Value, Value),
    /// A degree-2 equation with zero discriminant: one repeated root.
    RepeatedRoot(Value),
    /// A degree-2 equation with a negative real discriminant, or complex
    /// coefficients: a conjugate (or general complex) pair of roots.
    TwoComplex(Value, Value),
}

/// Solve `lhs = rhs` for its single free variable.
pub fn solve(lhs: &Expr, rhs: &Expr, env: &Environment) -> CoreResult<SolveResult> {
    let lhs_val = eval::eval(lhs, env)?;
    let rhs_val = eval::eval(rhs, env)?;
    let diff = eval::subtract_values(lhs_val, rhs_val)?;

    let poly = match diff {
        Value::Rational(r) => {
            return Ok(if num_traits::Zero::is_zero(&r) {
                SolveResult::Identity
            } else {
                SolveResult::Contradiction
            });
        }
        Value::Complex(_) => {
            // im != 0 by Value::Complex's invariant, so this is never zero.
            return Ok(SolveResult::Contradiction);
        }
        Value::Symbolic(p) => p,
        other => {
            return Err(CoreError::solve(format!(
                "cannot solve an equation involving a {}",
                other.kind_name()
            )));
        }
    };

    let vars = poly.free_vars();
    let var = match vars.as_slice() {
        [] => {
            return Err(CoreError::solve(
                "equation reduces to a constant; nothing to solve for",
            ));
        }
        [v] => v.clone(),
        _ => {
            return Err(CoreError::solve(format!(
                "equation has more than one variable: {}",
                vars.join(", ")
            )));
        }
    };

    let degree = poly.degree();
    if degree > 2 {
        return Err(CoreError::solve(format!(
            "cannot solve an equation of degree {degree}; only degree <= 2 is supported"
        )));
    }

    let a = coeff_to_complex(&poly.coeff_of_degree(&var, 2));
    let b = coeff_to_complex(&poly.coeff_of_degree(&var, 1));
    let c = coeff_to_complex(&poly.coeff_of_degree(&var, 0));

    if a.is_zero_complex() {
        return solve_linear(&b, &c);
    }
    solve_quadratic(&a, &b, &c)
}

fn coeff_to_complex(coeff: &Coeff) -> Complex {
    match coeff {
        Coeff::Rational(r) => Complex::new(r.clone(), zero()),
        Coeff::Complex(c) => c.clone(),
    }
}

fn zero() -> crate::numeric::Rational {
    crate::numeric::Rational::from_integer(0.into())
}

trait IsZeroComplex {
    fn is_zero_complex(&self) -> bool;
}

impl IsZeroComplex for Complex {
    fn is_zero_complex(&self) -> bool {
        use num_traits::Zero;
        self.re.is_zero() && self.im.is_zero()
    }
}

fn solve_linear(b: &Complex, c: &Complex) -> CoreResult<SolveResult> {
    if b.is_zero_complex() {
        return Ok(if c.is_zero_complex() {
            SolveResult::Identity
        } else {
            SolveResult::Contradiction
        });
    }
    let neg_c = c.neg();
    let root = neg_c.div(b)?;
    Ok(SolveResult::Linear(Value::from_complex(root)))
}

fn solve_quadratic(a: &Complex, b: &Complex, c: &Complex) -> CoreResult<SolveResult> {
    let two = Complex::new(crate::numeric::Rational::from_integer(2.into()), zero());
    let four = Complex::new(crate::numeric::Rational::from_integer(4.into()), zero());

    let disc = b.mul(b).sub(&four.mul(a).mul(c));
    let two_a = two.mul(a);
    crate::trace::log(format!("discriminant => {disc}"));

    if disc.is_real() && a.is_real() && b.is_real() {
        use num_traits::{Signed, Zero};
        let disc_re = disc.re.clone();
        let a_re = a.re.clone();
        let b_re = b.re.clone();
        let denom = &crate::numeric::Rational::from_integer(2.into()) * &a_re;

        if disc_re.is_negative() {
            let (coeff, radicand) = crate::numeric::rational::sqrt_radical(&(-&disc_re));
            crate::trace::log(format!("sqrt(|discriminant|) => {coeff}*sqrt({radicand})"));
            let real_part = -&b_re / &denom;
            let imag_coeff = &coeff / &denom;
            let r1 = Value::from_radical(real_part.clone(), imag_coeff.clone(), radicand.clone(), true);
            let r2 = Value::from_radical(real_part, -imag_coeff, radicand, true);
            return Ok(SolveResult::TwoComplex(r1, r2));
        }
        if disc_re.is_zero() {
            let root = -&b_re / &denom;
            crate::trace::log(format!("root => {root}"));
            return Ok(SolveResult::RepeatedRoot(Value::Rational(root)));
        }
        let (coeff, radicand) = crate::numeric::rational::sqrt_radical(&disc_re);
        crate::trace::log(format!("sqrt(discriminant) => {coeff}*sqrt({radicand})"));
        let real_part = -&b_re / &denom;
        let rad_coeff = &coeff / &denom;
        let r1 = Value::from_radical(real_part.clone(), rad_coeff.clone(), radicand.clone(), false);
        let r2 = Value::from_radical(real_part, -rad_coeff, radicand, false);
        return Ok(SolveResult::TwoReal(r1, r2));
    }

    // Complex coefficients: the quadratic formula in the complex field,
    // via the half-angle principal square root (no exact surd form for a
    // genuinely complex discriminant).
    let sqrt_disc = disc.principal_sqrt();
    crate::trace::log(format!("sqrt(discriminant) => {sqrt_disc}"));
    let r1 = b.neg().add(&sqrt_disc).div(&two_a)?;
    let r2 = b.neg().sub(&sqrt_disc).div(&two_a)?;
    Ok(SolveResult::TwoComplex(
        Value::from_complex(r1),
        Value::from_complex(r2),
    ))
}
