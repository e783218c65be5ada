//! Single-pass character-stream lexer.

use num_bigint::BigInt;
use num_rational::BigRational as Rational;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, Span};

/// An arithmetic/assignment operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^` or `**`
    Pow,
    /// `=`
    Assign,
}

/// A lexical token with its starting column.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token's kind.
    pub kind: TokenKind,
    /// The 0-indexed starting column of the token in the source line.
    pub col: usize,
}

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An exact rational numeric literal.
    Number(Rational),
    /// An identifier (variable or function name).
    Ident(String),
    /// The imaginary unit `i`.
    ImagUnit,
    /// An operator.
    Op(Operator),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `?`
    Question,
    /// End of input.
    End,
}

/// Tokenize a single input line.
pub fn lex(input: &str) -> CoreResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                i += 1;
            }
            '(' => {
                tokens.push(Token { kind: TokenKind::LParen, col: i });
                i += 1;
            }
            ')' => {
                tokens.push(Token { kind: TokenKind::RParen, col: i });
                i += 1;
            }
            '[' => {
                tokens.push(Token { kind: TokenKind::LBracket, col: i });
                i += 1;
            }
            ']' => {
                tokens.push(Token { kind: TokenKind::RBracket, col: i });
                i += 1;
            }
            ';' => {
                tokens.push(Token { kind: TokenKind::Semicolon, col: i });
                i += 1;
            }
            ',' => {
                tokens.push(Token { kind: TokenKind::Comma, col: i });
                i += 1;
            }
            '?' => {
                tokens.push(Token { kind: TokenKind::Question, col: i });
                i += 1;
            }
            '+' => {
                tokens.push(Token { kind: TokenKind::Op(Operator::Add), col: i });
                i += 1;
            }
            '-' => {
                tokens.push(Token { kind: TokenKind::Op(Operator::Sub), col: i });
                i += 1;
            }
            '/' => {
                tokens.push(Token { kind: TokenKind::Op(Operator::Div), col: i });
                i += 1;
            }
            '%' => {
                tokens.push(Token { kind: TokenKind::Op(Operator::Mod), col: i });
                i += 1;
            }
            '=' => {
                tokens.push(Token { kind: TokenKind::Op(Operator::Assign), col: i });
                i += 1;
            }
            '^' => {
                tokens.push(Token { kind: TokenKind::Op(Operator::Pow), col: i });
                i += 1;
            }
            '*' => {
                let start = i;
                i += 1;
                if i < chars.len() && chars[i] == '*' {
                    i += 1;
                    tokens.push(Token { kind: TokenKind::Op(Operator::Pow), col: start });
                } else {
                    tokens.push(Token { kind: TokenKind::Op(Operator::Mul), col: start });
                }
            }
            '0'..='9' => {
                let (tok, next) = lex_number(&chars, i)?;
                tokens.push(tok);
                i = next;
            }
            c if c == '_' || c.is_alphabetic() => {
                let (tok, next) = lex_ident(&chars, i);
                tokens.push(tok);
                i = next;
            }
            other => {
                return Err(CoreError::lex_at(
                    format!("unrecognised character '{other}'"),
                    Span::at(i),
                ));
            }
        }
    }

    let end_col = chars.len();
    tokens.push(Token { kind: TokenKind::End, col: end_col });
    Ok(tokens)
}

fn lex_number(chars: &[char], start: usize) -> CoreResult<(Token, usize)> {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        let dot = i;
        i += 1;
        let digits_start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            return Err(CoreError::lex_at(
                "malformed numeric literal: expected digits after '.'".to_string(),
                Span::at(dot),
            ));
        }
    }
    let text: String = chars[start..i].iter().collect();
    let value = parse_decimal(&text)
        .ok_or_else(|| CoreError::lex_at(format!("invalid number '{text}'"), Span::new(start, i)))?;
    Ok((Token { kind: TokenKind::Number(value), col: start }, i))
}

/// Parse a plain decimal literal (`123`, `3.14`) into an exact `Rational`.
fn parse_decimal(text: &str) -> Option<Rational> {
    match text.split_once('.') {
        None => {
            let n = BigInt::from_str(text).ok()?;
            Some(Rational::from_integer(n))
        }
        Some((whole, frac)) => {
            let combined = format!("{whole}{frac}");
            let numer = BigInt::from_str(&combined).ok()?;
            let denom_digits = frac.len() as u32;
            let denom = BigInt::from(10u32).pow(denom_digits);
            Some(Rational::new(numer, denom))
        }
    }
}

fn lex_ident(chars: &[char], start: usize) -> (Token, usize) {
    let mut i = start;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    let text: String = chars[start..i].iter().collect();
    let kind = if text == "i" {
        TokenKind::ImagUnit
    } else {
        TokenKind::Ident(text)
    };
    (Token { kind, col: start }, i)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::{lex, Operator, TokenKind};

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_simple_arithmetic() {
        let ks = kinds("2 + 3 * 4");
        assert_eq!(ks.len(), 6); // 2 + 3 * 4 End
        assert!(matches!(ks[1], TokenKind::Op(Operator::Add)));
        assert!(matches!(ks[3], TokenKind::Op(Operator::Mul)));
    }

    #[test]
    fn double_star_lexes_as_pow() {
        let ks = kinds("2**3");
        assert!(matches!(ks[1], TokenKind::Op(Operator::Pow)));
    }

    #[test]
    fn bare_i_is_imaginary_unit() {
        let ks = kinds("i");
        assert!(matches!(ks[0], TokenKind::ImagUnit));
    }

    #[test]
    fn identifier_containing_i_is_not_imaginary() {
        let ks = kinds("ix");
        assert!(matches!(&ks[0], TokenKind::Ident(s) if s == "ix"));
    }

    #[test]
    fn trailing_dot_is_rejected() {
        assert!(lex("3.").is_err());
    }

    #[test]
    fn decimal_number_parses_exactly() {
        let ks = kinds("3.14");
        match &ks[0] {
            TokenKind::Number(r) => assert_eq!(r.to_string(), "157/50"),
            other => panic!("expected Number, got {other:?}"),
        }
    }

    #[test]
    fn unrecognised_character_is_lex_error() {
        assert!(lex("2 @ 3").is_err());
    }
}
