//! Expression AST produced by the parser and consumed by the evaluator,
//! simplifier, and solver.

use crate::numeric::Rational;

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%` (Euclidean remainder, integers only)
    Mod,
    /// `^` / `**`
    Pow,
    /// Matrix product (also spelled `*` when both operands are matrices)
    MatMul,
}

/// A unary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Unary `+` (identity)
    Plus,
    /// Unary `-` (negation)
    Minus,
}

/// An expression AST node.
///
/// Children are read-only once built; a single line's AST does not need to
/// outlive that line's processing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An exact rational literal.
    Num(Rational),
    /// The imaginary unit `i`.
    ImagUnit,
    /// A variable or function-parameter reference.
    Var(String),
    /// A rectangular matrix literal; rows are validated equal-length at
    /// parse time.
    MatLit(Vec<Vec<Expr>>),
    /// A function application, builtin or user-defined.
    Call(String, Vec<Expr>),
    /// A unary-operator application.
    Unary(UnaryOp, Box<Expr>),
    /// A binary-operator application.
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

/// The parsed form of one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `IDENT = EXPR` — variable assignment.
    Assign(String, Expr),
    /// `IDENT(IDENT, ...) = EXPR` — function definition.
    FuncDef(String, Vec<String>, Expr),
    /// `EXPR = ?` — evaluate and print.
    EvalQuery(Expr),
    /// `EXPR1 = EXPR2 ?` — solve the equation.
    SolveQuery(Expr, Expr),
    /// A bare expression, evaluated and printed.
    Eval(Expr),
}

impl Expr {
    /// Collect the set of free variable names referenced by this
    /// expression (used by the parser to distinguish a function
    /// definition's parameter list and by the simplifier/solver to find the
    /// single free variable of a query).
    pub fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Self::Num(_) | Self::ImagUnit => {}
            Self::Var(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Self::MatLit(rows) => {
                for row in rows {
                    for e in row {
                        e.collect_vars(out);
                    }
                }
            }
            Self::Call(_, args) => {
                for a in args {
                    a.collect_vars(out);
                }
            }
            Self::Unary(_, inner) => inner.collect_vars(out),
            Self::Binary(_, l, r) => {
                l.collect_vars(out);
                r.collect_vars(out);
            }
        }
    }
}
