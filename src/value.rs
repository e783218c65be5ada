//! Runtime values and the variable/function environment.

use std::fmt;

use rustc_hash::FxHashMap;

use num_bigint::BigInt;

use crate::ast::Expr;
use crate::numeric::{Complex, Matrix, Radical, Rational};
use crate::poly::PolyExpr;

/// A stored user-defined function: its formal parameters and unevaluated
/// body. The body is re-evaluated against the environment at each call site
/// (late binding), so redefining a variable the function refers to changes
/// its behaviour on the next call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// Formal parameter names, in declaration order.
    pub params: Vec<String>,
    /// The function body, unevaluated.
    pub body: Expr,
}

/// A runtime value produced by evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An exact rational scalar.
    Rational(Rational),
    /// An exact complex scalar (`im != 0`; callers normalise to
    /// `Value::Rational` the moment the imaginary part collapses to zero).
    Complex(Complex),
    /// A matrix of rational or complex scalars.
    Matrix(Matrix),
    /// An exact quadratic-irrational scalar (`a + b*sqrt(d)`), produced by
    /// the solver when a discriminant is not a perfect-square rational.
    /// Never constructed with `coeff == 0` or `radicand == 1`; callers
    /// normalise those cases to `Value::Rational`/`Value::Complex` via
    /// [`Value::from_radical`].
    Radical(Radical),
    /// A symbolic polynomial expression — produced when evaluation
    /// encounters a free (unbound) variable.
    Symbolic(PolyExpr),
    /// A user-defined function.
    Function(FunctionDef),
}

impl Value {
    /// A short, user-facing name for this value's kind, used in type-error
    /// messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Rational(_) => "rational",
            Self::Complex(_) => "complex",
            Self::Matrix(_) => "matrix",
            Self::Radical(_) => "irrational radical",
            Self::Symbolic(_) => "symbolic expression",
            Self::Function(_) => "function",
        }
    }

    /// Normalise a `Complex` whose imaginary part is zero down to a plain
    /// `Rational`, matching the data-model invariant that `Value::Complex`
    /// is never constructed with `im == 0`.
    #[must_use]
    pub fn from_complex(c: Complex) -> Self {
        if c.is_real() {
            Self::Rational(c.re)
        } else {
            Self::Complex(c)
        }
    }

    /// Build `rational + coeff * sqrt(radicand)` (or, if `imaginary`,
    /// `rational + coeff * sqrt(radicand) * i`), collapsing to a plain
    /// `Rational`/`Complex` when the radical term vanishes (`coeff == 0`)
    /// or is already rational (`radicand == 1`).
    #[must_use]
    pub fn from_radical(rational: Rational, coeff: Rational, radicand: BigInt, imaginary: bool) -> Self {
        use num_traits::Zero;
        if coeff.is_zero() {
            return Self::Rational(rational);
        }
        if radicand == BigInt::from(1) {
            return if imaginary {
                Self::from_complex(Complex::new(rational, coeff))
            } else {
                Self::Rational(rational + coeff)
            };
        }
        Self::Radical(Radical::new(rational, coeff, radicand, imaginary))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rational(r) => write!(f, "{}", crate::format::format_rational(r)),
            Self::Complex(c) => write!(f, "{c}"),
            Self::Matrix(m) => write!(f, "{m}"),
            Self::Radical(r) => write!(f, "{r}"),
            Self::Symbolic(p) => write!(f, "{p}"),
            Self::Function(func) => write!(f, "<function/{}>", func.params.len()),
        }
    }
}

/// The session's bound names: variables (which may hold any `Value`,
/// including a stored `Function`) and, separately, user-defined functions.
///
/// Identifier lookup is case-sensitive; `i` can never be stored here (the
/// parser/evaluator keep it as the dedicated `Expr::ImagUnit` literal, so it
/// never competes with a user variable named `i`).
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: FxHashMap<String, Value>,
}

impl Environment {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a bound name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Bind (or rebind) a name to a value. Assignment and function
    /// definition both overwrite any prior binding of the same name
    /// unconditionally.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Iterate over all current bindings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::{Environment, Value};
    use num_bigint::BigInt;
    use num_rational::BigRational as Rational;

    #[test]
    fn set_then_get_roundtrips() {
        let mut env = Environment::new();
        env.set("a", Value::Rational(Rational::from_integer(BigInt::from(5))));
        assert_eq!(
            env.get("a"),
            Some(&Value::Rational(Rational::from_integer(BigInt::from(5))))
        );
    }

    #[test]
    fn reassignment_overwrites() {
        let mut env = Environment::new();
        env.set("a", Value::Rational(Rational::from_integer(BigInt::from(1))));
        env.set("a", Value::Rational(Rational::from_integer(BigInt::from(2))));
        assert_eq!(
            env.get("a"),
            Some(&Value::Rational(Rational::from_integer(BigInt::from(2))))
        );
    }

    #[test]
    fn unbound_name_is_none() {
        let env = Environment::new();
        assert!(env.get("z").is_none());
    }
}
