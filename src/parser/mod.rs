//! Recursive-descent parser: tokens in, [`Statement`] out.
//!
//! Precedence, low to high: additive, multiplicative, power (right
//! associative), unary, primary. Assignment and the trailing query marker
//! `?` are recognised at the statement level, not inside the expression
//! grammar, since `=` never appears nested inside an expression.

mod lexer;

pub use lexer::{lex, Operator, Token, TokenKind};

use crate::ast::{BinOp, Expr, Statement, UnaryOp};
use crate::error::{CoreError, CoreResult, Span};

/// Parse one input line into a [`Statement`].
pub fn parse_line(input: &str) -> CoreResult<Statement> {
    let tokens = lex(input)?;
    let mut parser = Parser::new(tokens);
    parser.parse_statement()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_col(&self) -> usize {
        self.tokens[self.pos].col
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), TokenKind::End)
    }

    fn error_here(&self, msg: impl Into<String>) -> CoreError {
        CoreError::parse_at(msg.into(), Span::at(self.peek_col()))
    }

    // ---- statement level -------------------------------------------------

    fn parse_statement(&mut self) -> CoreResult<Statement> {
        let has_question = self.strip_trailing_question();
        let eq_positions: Vec<usize> = self
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| matches!(t.kind, TokenKind::Op(Operator::Assign)))
            .map(|(i, _)| i)
            .collect();

        match eq_positions.as_slice() {
            [] => {
                if has_question {
                    return Err(self.error_here("expected '=' before '?'"));
                }
                let expr = self.parse_expr_slice(0, self.tokens.len() - 1)?;
                Ok(Statement::Eval(expr))
            }
            [k] => {
                let k = *k;
                if has_question {
                    let content_end = self.tokens.len() - 1; // index of the re-anchored End
                    let rhs_is_empty = k + 1 == content_end;
                    if rhs_is_empty {
                        // `EXPR = ?`: evaluate the left-hand side.
                        let lhs = self.parse_expr_slice(0, k)?;
                        Ok(Statement::EvalQuery(lhs))
                    } else if k == 0 {
                        // `= EXPR ?`: evaluate the right-hand side.
                        let rhs = self.parse_expr_slice(1, content_end)?;
                        Ok(Statement::EvalQuery(rhs))
                    } else {
                        let lhs = self.parse_expr_slice(0, k)?;
                        let rhs = self.parse_expr_slice(k + 1, content_end)?;
                        Ok(Statement::SolveQuery(lhs, rhs))
                    }
                } else {
                    self.parse_assignment_or_funcdef(k)
                }
            }
            _ => Err(CoreError::parse("at most one '=' is allowed per line")),
        }
    }

    /// Strip a trailing `?` (immediately before `End`) if present, leaving
    /// the rest of the token stream untouched.
    fn strip_trailing_question(&mut self) -> bool {
        let last_idx = self.tokens.len().saturating_sub(2); // index before End
        if matches!(
            self.tokens.get(last_idx).map(|t| &t.kind),
            Some(TokenKind::Question)
        ) {
            self.tokens.remove(last_idx);
            true
        } else {
            false
        }
    }

    fn parse_assignment_or_funcdef(&mut self, eq_pos: usize) -> CoreResult<Statement> {
        let lhs = self.parse_expr_slice(0, eq_pos)?;
        let rhs = self.parse_expr_slice(eq_pos + 1, self.tokens.len() - 1)?;
        match lhs {
            Expr::Var(name) => Ok(Statement::Assign(name, rhs)),
            Expr::Call(name, args) => {
                let mut params = Vec::with_capacity(args.len());
                for a in &args {
                    match a {
                        Expr::Var(p) => params.push(p.clone()),
                        _ => {
                            return Err(CoreError::parse(
                                "function parameters must be plain identifiers",
                            ));
                        }
                    }
                }
                let mut seen: Vec<&String> = Vec::new();
                for p in &params {
                    if seen.contains(&p) {
                        return Err(CoreError::parse(format!(
                            "duplicate parameter name '{p}'"
                        )));
                    }
                    seen.push(p);
                }
                Ok(Statement::FuncDef(name, params, rhs))
            }
            _ => Err(CoreError::parse(
                "left-hand side of '=' must be a variable or function definition",
            )),
        }
    }

    /// Parse the expression in `tokens[start..end]` (end exclusive),
    /// re-anchored with its own `End` sentinel, requiring the slice to be
    /// consumed completely.
    fn parse_expr_slice(&self, start: usize, end: usize) -> CoreResult<Expr> {
        if start >= end {
            return Err(CoreError::parse("expected an expression"));
        }
        let mut slice: Vec<Token> = self.tokens[start..end].to_vec();
        let end_col = slice.last().map_or(0, |t| t.col + 1);
        slice.push(Token {
            kind: TokenKind::End,
            col: end_col,
        });
        let mut sub = Parser::new(slice);
        let expr = sub.parse_expr()?;
        if !sub.at_end() {
            return Err(sub.error_here("unexpected trailing input"));
        }
        Ok(expr)
    }

    // ---- expression grammar ----------------------------------------------

    fn parse_expr(&mut self) -> CoreResult<Expr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> CoreResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Op(Operator::Add) => BinOp::Add,
                TokenKind::Op(Operator::Sub) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> CoreResult<Expr> {
        let mut lhs = self.parse_power()?;
        loop {
            let op = match self.peek() {
                TokenKind::Op(Operator::Mul) => BinOp::Mul,
                TokenKind::Op(Operator::Div) => BinOp::Div,
                TokenKind::Op(Operator::Mod) => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_power()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_power(&mut self) -> CoreResult<Expr> {
        let base = self.parse_unary()?;
        if matches!(self.peek(), TokenKind::Op(Operator::Pow)) {
            self.advance();
            let exp = self.parse_power()?; // right-associative
            Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exp)))
        } else {
            Ok(base)
        }
    }

    fn parse_unary(&mut self) -> CoreResult<Expr> {
        match self.peek() {
            TokenKind::Op(Operator::Add) => {
                self.advance();
                let inner = self.parse_unary()?;
                Ok(Expr::Unary(UnaryOp::Plus, Box::new(inner)))
            }
            TokenKind::Op(Operator::Sub) => {
                self.advance();
                let inner = self.parse_unary()?;
                Ok(Expr::Unary(UnaryOp::Minus, Box::new(inner)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> CoreResult<Expr> {
        match self.peek().clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Num(n))
            }
            TokenKind::ImagUnit => {
                self.advance();
                Ok(Expr::ImagUnit)
            }
            TokenKind::Ident(name) => {
                self.advance();
                if matches!(self.peek(), TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Var(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_matrix_literal(),
            _ => Err(self.error_here("expected a number, identifier, '(', or '['")),
        }
    }

    fn parse_call_args(&mut self) -> CoreResult<Vec<Expr>> {
        let mut args = Vec::new();
        if matches!(self.peek(), TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error_here("expected ',' or ')'")),
            }
        }
        Ok(args)
    }

    fn parse_matrix_literal(&mut self) -> CoreResult<Expr> {
        self.expect(TokenKind::LBracket)?;
        let mut rows = Vec::new();
        loop {
            rows.push(self.parse_matrix_row()?);
            match self.peek() {
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error_here("expected ';' or ']'")),
            }
        }
        let width = rows[0].len();
        if rows.iter().any(|r| r.len() != width) {
            return Err(CoreError::parse(
                "matrix literal rows must all have the same length",
            ));
        }
        Ok(Expr::MatLit(rows))
    }

    fn parse_matrix_row(&mut self) -> CoreResult<Vec<Expr>> {
        self.expect(TokenKind::LBracket)?;
        let mut entries = Vec::new();
        loop {
            entries.push(self.parse_expr()?);
            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error_here("expected ',' or ']'")),
            }
        }
        if entries.is_empty() {
            return Err(CoreError::parse("matrix rows must not be empty"));
        }
        Ok(entries)
    }

    fn expect(&mut self, want: TokenKind) -> CoreResult<()> {
        if std::mem::discriminant(self.peek()) == std::mem::discriminant(&want) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!("expected {want:?}")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::parse_line;
    use crate::ast::{BinOp, Expr, Statement};

    #[test]
    fn parses_simple_arithmetic_with_precedence() {
        let stmt = parse_line("2 + 3 * 4").unwrap();
        match stmt {
            Statement::Eval(Expr::Binary(BinOp::Add, lhs, rhs)) => {
                assert!(matches!(*lhs, Expr::Num(_)));
                assert!(matches!(*rhs, Expr::Binary(BinOp::Mul, _, _)));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        // 2^3^2 == 2^(3^2)
        let stmt = parse_line("2^3^2").unwrap();
        match stmt {
            Statement::Eval(Expr::Binary(BinOp::Pow, _, rhs)) => {
                assert!(matches!(*rhs, Expr::Binary(BinOp::Pow, _, _)));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn assignment_is_recognised() {
        let stmt = parse_line("a = 5").unwrap();
        assert!(matches!(stmt, Statement::Assign(name, _) if name == "a"));
    }

    #[test]
    fn function_definition_is_recognised() {
        let stmt = parse_line("f(x) = x^2 + 1").unwrap();
        match stmt {
            Statement::FuncDef(name, params, _) => {
                assert_eq!(name, "f");
                assert_eq!(params, vec!["x".to_string()]);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn eval_query_is_recognised() {
        let stmt = parse_line("= 2 + 2 ?").unwrap();
        assert!(matches!(stmt, Statement::EvalQuery(_)));
    }

    #[test]
    fn trailing_eval_query_is_recognised() {
        let stmt = parse_line("f(3) = ?").unwrap();
        assert!(matches!(stmt, Statement::EvalQuery(_)));
    }

    #[test]
    fn solve_query_is_recognised() {
        let stmt = parse_line("x^2 - 1 = 0 ?").unwrap();
        assert!(matches!(stmt, Statement::SolveQuery(_, _)));
    }

    #[test]
    fn implicit_multiplication_is_rejected() {
        assert!(parse_line("2x").is_err());
    }

    #[test]
    fn matrix_literal_with_mismatched_rows_is_rejected() {
        assert!(parse_line("[[1,2];[3]]").is_err());
    }

    #[test]
    fn matrix_literal_parses() {
        let stmt = parse_line("[[1,2];[3,4]]").unwrap();
        assert!(matches!(stmt, Statement::Eval(Expr::MatLit(_))));
    }

    #[test]
    fn function_call_parses_arguments() {
        let stmt = parse_line("sqrt(4)").unwrap();
        match stmt {
            Statement::Eval(Expr::Call(name, args)) => {
                assert_eq!(name, "sqrt");
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }
}
