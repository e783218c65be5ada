//! Core interpreter library for the computorv2 expression language: exact
//! rational/complex/matrix arithmetic, symbolic polynomial simplification,
//! and degree <= 2 equation solving.
//!
//! The binary crate (`src/main.rs`) is a thin CLI/REPL shell around
//! [`process`], which is also what the integration tests under `tests/`
//! exercise directly.

pub mod ast;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod format;
pub mod numeric;
pub mod parser;
pub mod poly;
pub mod solve;
pub mod trace;
pub mod value;

use error::CoreResult;
use solve::SolveResult;
use value::{Environment, FunctionDef, Value};

/// The outcome of processing one input line, for the REPL/CLI shell to
/// render.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// An assignment or function definition: nothing is printed but the
    /// assigned value is reported for REPL feedback.
    Bound {
        /// The bound name.
        name: String,
        /// The value the name is now bound to (a `FunctionDef` is rendered
        /// by arity, not expanded).
        value: Value,
    },
    /// A plain expression, or `expr = ?`: its value.
    Value(Value),
    /// `lhs = rhs ?`: the solved root set.
    Solved(SolveResult),
}

/// Parse and evaluate one line of input against `env`, mutating it on
/// assignment or function definition.
///
/// # Errors
/// Returns the first [`error::CoreError`] raised by lexing, parsing,
/// evaluation, or solving; `env` is left unmodified on failure.
pub fn process(line: &str, env: &mut Environment) -> CoreResult<Outcome> {
    let stmt = parser::parse_line(line)?;
    match stmt {
        ast::Statement::Assign(name, expr) => {
            let value = eval::eval(&expr, env)?;
            env.set(name.clone(), value.clone());
            Ok(Outcome::Bound { name, value })
        }
        ast::Statement::FuncDef(name, params, body) => {
            let value = Value::Function(FunctionDef { params, body });
            env.set(name.clone(), value.clone());
            Ok(Outcome::Bound { name, value })
        }
        ast::Statement::EvalQuery(expr) | ast::Statement::Eval(expr) => {
            let value = eval::eval(&expr, env)?;
            Ok(Outcome::Value(value))
        }
        ast::Statement::SolveQuery(lhs, rhs) => {
            let result = solve::solve(&lhs, &rhs, env)?;
            Ok(Outcome::Solved(result))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::{process, Outcome};
    use crate::value::{Environment, Value};
    use num_bigint::BigInt;
    use num_rational::BigRational as Rational;

    #[test]
    fn assignment_then_reference_across_lines() {
        let mut env = Environment::new();
        process("a = 5", &mut env).unwrap();
        let outcome = process("a + 1", &mut env).unwrap();
        match outcome {
            Outcome::Value(Value::Rational(r)) => {
                assert_eq!(r, Rational::from_integer(BigInt::from(6)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn function_definition_then_call() {
        let mut env = Environment::new();
        process("f(x) = x^2 + 1", &mut env).unwrap();
        let outcome = process("f(3)", &mut env).unwrap();
        match outcome {
            Outcome::Value(Value::Rational(r)) => {
                assert_eq!(r, Rational::from_integer(BigInt::from(10)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn failed_line_does_not_mutate_environment() {
        let mut env = Environment::new();
        process("a = 5", &mut env).unwrap();
        assert!(process("a = 1 / 0", &mut env).is_err());
        let outcome = process("a", &mut env).unwrap();
        match outcome {
            Outcome::Value(Value::Rational(r)) => {
                assert_eq!(r, Rational::from_integer(BigInt::from(5)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
