//! Post-order expression evaluator.
//!
//! Evaluation walks the AST bottom-up. A bound variable reduces to its
//! stored value; an unbound one reduces to a [`PolyExpr`] of itself,
//! letting arithmetic on it build up symbolically instead of failing. A
//! depth and node-count budget guards against runaway recursion on
//! pathological input (deeply nested parentheses, self-referential
//! function bodies).

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::builtins;
use crate::error::{CoreError, CoreResult};
use crate::numeric::{Complex, Matrix, MatrixScalar, Rational};
use crate::poly::{Coeff, PolyExpr};
use crate::value::{Environment, FunctionDef, Value};

/// Maximum AST recursion depth a single evaluation may reach.
pub const DEFAULT_MAX_DEPTH: usize = 100;
/// Maximum number of AST nodes a single evaluation may visit.
pub const DEFAULT_MAX_NODES: usize = 10_000;

struct Budget {
    max_depth: usize,
    max_nodes: usize,
    nodes_visited: usize,
}

impl Budget {
    fn enter(&mut self, depth: usize) -> CoreResult<()> {
        if depth > self.max_depth {
            return Err(CoreError::math("expression nesting is too deep"));
        }
        self.nodes_visited += 1;
        if self.nodes_visited > self.max_nodes {
            return Err(CoreError::math("expression is too large to evaluate"));
        }
        Ok(())
    }
}

/// Evaluate `expr` against `env`, producing a [`Value`].
pub fn eval(expr: &Expr, env: &Environment) -> CoreResult<Value> {
    let mut budget = Budget {
        max_depth: DEFAULT_MAX_DEPTH,
        max_nodes: DEFAULT_MAX_NODES,
        nodes_visited: 0,
    };
    eval_inner(expr, env, &mut budget, 0)
}

/// Subtract two already-evaluated values, for the solver's `lhs - rhs = 0`
/// reduction.
pub fn subtract_values(a: Value, b: Value) -> CoreResult<Value> {
    eval_binary(BinOp::Sub, a, b)
}

fn eval_inner(expr: &Expr, env: &Environment, budget: &mut Budget, depth: usize) -> CoreResult<Value> {
    budget.enter(depth)?;
    match expr {
        Expr::Num(n) => Ok(Value::Rational(n.clone())),
        Expr::ImagUnit => Ok(Value::from_complex(Complex::i())),
        Expr::Var(name) => Ok(lookup_var(name, env)),
        Expr::MatLit(rows) => eval_matrix_literal(rows, env, budget, depth),
        Expr::Call(name, args) => eval_call(name, args, env, budget, depth),
        Expr::Unary(op, inner) => {
            let v = eval_inner(inner, env, budget, depth + 1)?;
            eval_unary(*op, v)
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = eval_inner(lhs, env, budget, depth + 1)?;
            let r = eval_inner(rhs, env, budget, depth + 1)?;
            eval_binary(*op, l, r)
        }
    }
}

fn lookup_var(name: &str, env: &Environment) -> Value {
    match env.get(name) {
        Some(v) => v.clone(),
        None => Value::Symbolic(PolyExpr::variable(name)),
    }
}

fn eval_matrix_literal(
    rows: &[Vec<Expr>],
    env: &Environment,
    budget: &mut Budget,
    depth: usize,
) -> CoreResult<Value> {
    let ncols = rows[0].len();
    let mut data = Vec::with_capacity(rows.len() * ncols);
    for row in rows {
        for entry in row {
            let v = eval_inner(entry, env, budget, depth + 1)?;
            data.push(value_to_matrix_scalar(v)?);
        }
    }
    let m = Matrix::new(rows.len(), ncols, data)?;
    Ok(Value::Matrix(m))
}

fn value_to_matrix_scalar(v: Value) -> CoreResult<MatrixScalar> {
    match v {
        Value::Rational(r) => Ok(MatrixScalar::Rational(r)),
        Value::Complex(c) => Ok(MatrixScalar::Complex(c)),
        other => Err(CoreError::type_err(format!(
            "matrix entries must be scalar, found a {}",
            other.kind_name()
        ))),
    }
}

fn eval_call(
    name: &str,
    args: &[Expr],
    env: &Environment,
    budget: &mut Budget,
    depth: usize,
) -> CoreResult<Value> {
    let values = args
        .iter()
        .map(|a| eval_inner(a, env, budget, depth + 1))
        .collect::<CoreResult<Vec<_>>>()?;

    if let Some(result) = builtins::call(name, &values) {
        return result;
    }

    match env.get(name) {
        Some(Value::Function(func)) => call_user_function(func, &values, env, budget, depth),
        Some(other) => Err(CoreError::type_err(format!(
            "'{name}' is a {}, not a function",
            other.kind_name()
        ))),
        None => Err(CoreError::NameError {
            name: name.to_string(),
        }),
    }
}

fn call_user_function(
    func: &FunctionDef,
    args: &[Value],
    env: &Environment,
    budget: &mut Budget,
    depth: usize,
) -> CoreResult<Value> {
    if args.len() != func.params.len() {
        return Err(CoreError::ArityError {
            name: "<function>".to_string(),
            expected: func.params.len(),
            got: args.len(),
        });
    }
    let mut call_env = env.clone();
    for (param, value) in func.params.iter().zip(args) {
        call_env.set(param.clone(), value.clone());
    }
    eval_inner(&func.body, &call_env, budget, depth + 1)
}

fn eval_unary(op: UnaryOp, v: Value) -> CoreResult<Value> {
    match op {
        UnaryOp::Plus => Ok(v),
        UnaryOp::Minus => negate(v),
    }
}

fn negate(v: Value) -> CoreResult<Value> {
    match v {
        Value::Rational(r) => Ok(Value::Rational(-r)),
        Value::Complex(c) => Ok(Value::Complex(c.neg())),
        Value::Matrix(m) => Ok(Value::Matrix(m.neg())),
        Value::Radical(r) => Ok(Value::from_radical(-r.rational, -r.coeff, r.radicand, r.imaginary)),
        Value::Symbolic(p) => Ok(Value::Symbolic(p.neg())),
        Value::Function(_) => Err(CoreError::type_err("cannot negate a function")),
    }
}

fn eval_binary(op: BinOp, lhs: Value, rhs: Value) -> CoreResult<Value> {
    use Value::{Complex as Cplx, Function, Matrix as Mat, Rational as Rat, Symbolic};

    match (op, lhs, rhs) {
        (BinOp::Add, Rat(a), Rat(b)) => Ok(Value::Rational(a + b)),
        (BinOp::Sub, Rat(a), Rat(b)) => Ok(Value::Rational(a - b)),
        (BinOp::Mul, Rat(a), Rat(b)) => Ok(Value::Rational(a * b)),
        (BinOp::Div, Rat(a), Rat(b)) => {
            if b.numer() == &num_bigint::BigInt::from(0) {
                return Err(CoreError::math("division by zero"));
            }
            Ok(Value::Rational(a / b))
        }
        (BinOp::Mod, Rat(a), Rat(b)) => {
            crate::numeric::rational::euclidean_rem(&a, &b).map(Value::Rational)
        }
        (BinOp::Pow, Rat(a), Rat(b)) => eval_pow_rational_base(a, b),

        (op @ (BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div), a @ (Rat(_) | Cplx(_)), b @ (Rat(_) | Cplx(_))) => {
            eval_complex_arith(op, a, b)
        }
        (BinOp::Pow, Cplx(base), Rat(exp)) => {
            let e = rational_to_i64_exponent(&exp)?;
            Ok(Value::from_complex(base.pow_int(e)?))
        }

        (BinOp::Add, Mat(a), Mat(b)) => Ok(Value::Matrix(a.add(&b)?)),
        (BinOp::Sub, Mat(a), Mat(b)) => Ok(Value::Matrix(a.sub(&b)?)),
        (BinOp::Mul, Mat(a), Mat(b)) => Ok(Value::Matrix(a.mul_elementwise(&b)?)),
        (BinOp::Mul, Mat(m), Rat(scalar)) | (BinOp::Mul, Rat(scalar), Mat(m)) => {
            Ok(Value::Matrix(m.scalar_mul(&scalar)))
        }
        (BinOp::Pow, Mat(m), Rat(exp)) => eval_matrix_pow(m, exp),
        (BinOp::Pow, Mat(a), Mat(b)) | (BinOp::MatMul, Mat(a), Mat(b)) => {
            Ok(Value::Matrix(a.matmul(&b)?))
        }

        (op, Symbolic(p), b) if matches!(b, Rat(_) | Cplx(_) | Symbolic(_)) => {
            eval_symbolic(op, Value::Symbolic(p), b)
        }
        (op, a, Symbolic(p)) if matches!(a, Rat(_) | Cplx(_)) => {
            eval_symbolic(op, a, Value::Symbolic(p))
        }

        (_, Function(_), _) | (_, _, Function(_)) => {
            Err(CoreError::type_err("a function value cannot be used in an arithmetic expression"))
        }
        (_, a, b) => Err(CoreError::type_err(format!(
            "'{}' is not defined between a {} and a {}",
            binop_symbol(op),
            a.kind_name(),
            b.kind_name()
        ))),
    }
}

fn eval_pow_rational_base(base: Rational, exp: Rational) -> CoreResult<Value> {
    let e = rational_to_i64_exponent(&exp)?;
    crate::numeric::rational::pow_int(&base, e).map(Value::Rational)
}

fn rational_to_i64_exponent(exp: &Rational) -> CoreResult<i64> {
    if !exp.is_integer() {
        return Err(CoreError::type_err("exponents must be integers"));
    }
    exp.numer()
        .to_string()
        .parse::<i64>()
        .map_err(|_| CoreError::math("exponent is too large"))
}

fn eval_complex_arith(op: BinOp, lhs: Value, rhs: Value) -> CoreResult<Value> {
    let a = as_complex(lhs)?;
    let b = as_complex(rhs)?;
    let result = match op {
        BinOp::Add => a.add(&b),
        BinOp::Sub => a.sub(&b),
        BinOp::Mul => a.mul(&b),
        BinOp::Div => a.div(&b)?,
        BinOp::Mod | BinOp::Pow | BinOp::MatMul => {
            return Err(CoreError::type_err(format!(
                "'{}' is not defined between these operands",
                binop_symbol(op)
            )));
        }
    };
    Ok(Value::from_complex(result))
}

fn as_complex(v: Value) -> CoreResult<Complex> {
    match v {
        Value::Rational(r) => Ok(Complex::new(r, Rational::from_integer(0.into()))),
        Value::Complex(c) => Ok(c),
        other => Err(CoreError::type_err(format!(
            "expected a rational or complex value, found a {}",
            other.kind_name()
        ))),
    }
}

fn eval_matrix_pow(m: Matrix, exp: Rational) -> CoreResult<Value> {
    if m.rows() != m.cols() {
        return Err(CoreError::math("matrix exponentiation requires a square matrix"));
    }
    let e = rational_to_i64_exponent(&exp)?;
    if e < 0 {
        return Err(CoreError::type_err("matrix exponents must be non-negative"));
    }
    let n = m.rows();
    let identity_data: Vec<MatrixScalar> = (0..n * n)
        .map(|idx| {
            if idx / n == idx % n {
                MatrixScalar::Rational(Rational::from_integer(1.into()))
            } else {
                MatrixScalar::Rational(Rational::from_integer(0.into()))
            }
        })
        .collect();
    let mut result = Matrix::new(n, n, identity_data)?;
    let mut base = m;
    let mut e = e as u64;
    while e > 0 {
        if e & 1 == 1 {
            result = result.matmul(&base)?;
        }
        base = base.matmul(&base)?;
        e >>= 1;
    }
    Ok(Value::Matrix(result))
}

fn eval_symbolic(op: BinOp, lhs: Value, rhs: Value) -> CoreResult<Value> {
    let lhs_poly = value_to_poly(&lhs)?;
    let before = lhs_poly.to_string();
    let result = eval_symbolic_inner(op, &lhs_poly, rhs)?;
    crate::trace::log(format!("{} {before} => {result}", binop_symbol(op)));
    Ok(result)
}

fn eval_symbolic_inner(op: BinOp, lhs_poly: &PolyExpr, rhs: Value) -> CoreResult<Value> {
    match op {
        BinOp::Add => Ok(poly_to_value(lhs_poly.add(&value_to_poly(&rhs)?))),
        BinOp::Sub => Ok(poly_to_value(lhs_poly.sub(&value_to_poly(&rhs)?))),
        BinOp::Mul => Ok(poly_to_value(lhs_poly.mul(&value_to_poly(&rhs)?))),
        BinOp::Div => {
            let rhs_poly = value_to_poly(&rhs)?;
            let coeff = rhs_poly
                .as_constant()
                .ok_or_else(|| CoreError::type_err("division by a non-constant symbolic expression is not supported"))?;
            let inv = scalar_inverse(coeff)?;
            Ok(poly_to_value(lhs_poly.scalar_mul(&inv)))
        }
        BinOp::Pow => {
            let rhs_poly = value_to_poly(&rhs)?;
            let coeff = rhs_poly
                .as_constant()
                .ok_or_else(|| CoreError::type_err("symbolic exponents are not supported"))?;
            let exp = match coeff {
                Coeff::Rational(r) => rational_to_i64_exponent(r)?,
                Coeff::Complex(_) => {
                    return Err(CoreError::type_err("exponents must be real integers"));
                }
            };
            Ok(poly_to_value(lhs_poly.pow_int(exp)?))
        }
        BinOp::Mod => Err(CoreError::type_err("'%' is not defined on symbolic expressions")),
        BinOp::MatMul => Err(CoreError::type_err("matrix product is not defined on symbolic expressions")),
    }
}

fn scalar_inverse(coeff: &Coeff) -> CoreResult<Coeff> {
    match coeff {
        Coeff::Rational(r) => {
            if r.numer() == &num_bigint::BigInt::from(0) {
                return Err(CoreError::math("division by zero"));
            }
            Ok(Coeff::Rational(r.recip()))
        }
        Coeff::Complex(c) => Ok(Coeff::Complex(c.inv()?)),
    }
}

fn value_to_poly(v: &Value) -> CoreResult<PolyExpr> {
    match v {
        Value::Rational(r) => Ok(PolyExpr::constant(Coeff::Rational(r.clone()))),
        Value::Complex(c) => Ok(PolyExpr::constant(Coeff::Complex(c.clone()))),
        Value::Symbolic(p) => Ok(p.clone()),
        other => Err(CoreError::type_err(format!(
            "a {} cannot be combined with a symbolic expression",
            other.kind_name()
        ))),
    }
}

fn poly_to_value(p: PolyExpr) -> Value {
    match p.as_constant() {
        Some(Coeff::Rational(r)) => Value::Rational(r.clone()),
        Some(Coeff::Complex(c)) => Value::from_complex(c.clone()),
        None if p.is_zero() => Value::Rational(Rational::from_integer(0.into())),
        None => Value::Symbolic(p),
    }
}

fn binop_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Pow => "^",
        BinOp::MatMul => "*",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::eval;
    use crate::parser::parse_line;
    use crate::value::{Environment, Value};
    use crate::ast::Statement;
    use num_bigint::BigInt;
    use num_rational::BigRational as Rational;

    fn eval_str(src: &str, env: &Environment) -> Value {
        match parse_line(src).unwrap() {
            Statement::Eval(e) | Statement::EvalQuery(e) => eval(&e, env).unwrap(),
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    fn rat(n: i64) -> Value {
        Value::Rational(Rational::from_integer(BigInt::from(n)))
    }

    #[test]
    fn arithmetic_precedence() {
        let env = Environment::new();
        assert_eq!(eval_str("2 + 3 * 4", &env), rat(14));
    }

    #[test]
    fn imaginary_unit_squared_is_minus_one() {
        let env = Environment::new();
        assert_eq!(eval_str("i * i", &env), rat(-1));
    }

    #[test]
    fn unbound_variable_is_symbolic() {
        let env = Environment::new();
        assert!(matches!(eval_str("x + 1", &env), Value::Symbolic(_)));
    }

    #[test]
    fn bound_variable_substitutes() {
        let mut env = Environment::new();
        env.set("x", rat(5));
        assert_eq!(eval_str("x + 1", &env), rat(6));
    }

    #[test]
    fn matrix_determinant_via_builtin() {
        let env = Environment::new();
        assert_eq!(eval_str("det([[1,2];[3,4]])", &env), rat(-2));
    }

    #[test]
    fn division_by_zero_is_math_error() {
        let env = Environment::new();
        let expr = match parse_line("1 / 0").unwrap() {
            Statement::Eval(e) => e,
            other => panic!("expected an expression statement, got {other:?}"),
        };
        assert!(eval(&expr, &env).is_err());
    }
}
