//! The fixed registry of builtin functions.

use num_traits::Signed;

use crate::error::{CoreError, CoreResult};
use crate::numeric::{rational, Complex, Rational};
use crate::value::Value;

/// Dispatch a builtin call by name. Returns `None` if `name` does not name
/// a builtin (the caller should then look for a user-defined function).
pub fn call(name: &str, args: &[Value]) -> Option<CoreResult<Value>> {
    let arity = match name {
        "sqrt" | "abs" | "sin" | "cos" | "tan" | "exp" | "ln" => 1,
        "det" | "inv" => 1,
        _ => return None,
    };
    if args.len() != arity {
        return Some(Err(CoreError::ArityError {
            name: name.to_string(),
            expected: arity,
            got: args.len(),
        }));
    }
    Some(match name {
        "sqrt" => sqrt(&args[0]),
        "abs" => abs(&args[0]),
        "sin" => real_unary(name, &args[0], f64::sin),
        "cos" => real_unary(name, &args[0], f64::cos),
        "tan" => real_unary(name, &args[0], f64::tan),
        "exp" => real_unary(name, &args[0], f64::exp),
        "ln" => ln(&args[0]),
        "det" => det(&args[0]),
        "inv" => inv(&args[0]),
        _ => return None,
    })
}

fn as_real(name: &str, v: &Value) -> CoreResult<Rational> {
    match v {
        Value::Rational(r) => Ok(r.clone()),
        _ => Err(CoreError::type_err(format!(
            "'{name}' expects a rational argument, got a {}",
            v.kind_name()
        ))),
    }
}

fn sqrt(v: &Value) -> CoreResult<Value> {
    match v {
        Value::Rational(r) => {
            if r.is_negative() {
                let z = Complex::new(r.clone(), Rational::from_integer(0.into()));
                Ok(Value::from_complex(z.principal_sqrt()))
            } else {
                let root = rational::exact_sqrt(r)
                    .unwrap_or_else(|| rational::from_f64_approx(rational::to_f64(r).sqrt()));
                Ok(Value::Rational(root))
            }
        }
        Value::Complex(c) => Ok(Value::from_complex(c.principal_sqrt())),
        other => Err(CoreError::type_err(format!(
            "'sqrt' is not defined for a {}",
            other.kind_name()
        ))),
    }
}

fn abs(v: &Value) -> CoreResult<Value> {
    match v {
        Value::Rational(r) => Ok(Value::Rational(r.abs())),
        Value::Complex(c) => Ok(Value::Rational(c.abs())),
        other => Err(CoreError::type_err(format!(
            "'abs' is not defined for a {}",
            other.kind_name()
        ))),
    }
}

fn real_unary(name: &str, v: &Value, f: fn(f64) -> f64) -> CoreResult<Value> {
    let r = as_real(name, v)?;
    let x = rational::to_f64(&r);
    Ok(Value::Rational(rational::from_f64_approx(f(x))))
}

fn ln(v: &Value) -> CoreResult<Value> {
    let r = as_real("ln", v)?;
    if !r.is_positive() {
        return Err(CoreError::math("'ln' is only defined for positive arguments"));
    }
    let x = rational::to_f64(&r);
    Ok(Value::Rational(rational::from_f64_approx(x.ln())))
}

fn det(v: &Value) -> CoreResult<Value> {
    match v {
        Value::Matrix(m) => {
            let scalar = m.det()?;
            Ok(match scalar {
                crate::numeric::MatrixScalar::Rational(r) => Value::Rational(r),
                crate::numeric::MatrixScalar::Complex(c) => Value::from_complex(c),
            })
        }
        other => Err(CoreError::type_err(format!(
            "'det' expects a matrix argument, got a {}",
            other.kind_name()
        ))),
    }
}

fn inv(v: &Value) -> CoreResult<Value> {
    match v {
        Value::Matrix(m) => Ok(Value::Matrix(m.inv()?)),
        other => Err(CoreError::type_err(format!(
            "'inv' expects a matrix argument, got a {}",
            other.kind_name()
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::call;
    use crate::value::Value;
    use num_bigint::BigInt;
    use num_rational::BigRational as Rational;

    fn r(n: i64) -> Value {
        Value::Rational(Rational::from_integer(BigInt::from(n)))
    }

    #[test]
    fn sqrt_of_perfect_square() {
        let result = call("sqrt", &[r(4)]).unwrap().unwrap();
        assert_eq!(result, r(2));
    }

    #[test]
    fn sqrt_of_negative_is_complex() {
        let result = call("sqrt", &[r(-4)]).unwrap().unwrap();
        assert!(matches!(result, Value::Complex(_)));
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(call("frobnicate", &[r(1)]).is_none());
    }

    #[test]
    fn wrong_arity_is_arity_error() {
        assert!(call("sqrt", &[r(1), r(2)]).unwrap().is_err());
    }

    #[test]
    fn ln_of_nonpositive_is_math_error() {
        assert!(call("ln", &[r(0)]).unwrap().is_err());
    }
}
