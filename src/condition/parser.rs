//! condition::parser
//!
//! `nom` grammar for condition expressions.
//!
//! # Grammar
//!
//! ```text
//! expr      := and_expr ("or" and_expr)*
//! and_expr  := unary ("and" unary)*
//! unary     := "not" unary | "(" expr ")" | predicate
//! predicate := file("NAME")
//!            | active("NAME")
//!            | checksum("NAME", HEX)
//!            | version("NAME", "VERSION", CMP)
//! CMP       := == | != | <= | >= | < | >
//! ```
//!
//! Names are double-quoted and contain no escapes. Checksums are
//! hexadecimal, with or without a `0x` prefix. `and` binds tighter than
//! `or`; `not` binds tightest.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, hex_digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, value},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};
use thiserror::Error;

use crate::core::types::Version;

/// A condition expression could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

/// Comparison operator for `version(...)` predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Comparator {
    /// Apply the comparison to an installed and a wanted version.
    pub fn compare(self, installed: &Version, wanted: &Version) -> bool {
        match self {
            Comparator::Eq => installed == wanted,
            Comparator::Ne => installed != wanted,
            Comparator::Lt => installed < wanted,
            Comparator::Gt => installed > wanted,
            Comparator::Le => installed <= wanted,
            Comparator::Ge => installed >= wanted,
        }
    }
}

/// Parsed condition expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// File with the given name exists.
    File(String),
    /// Entity with the given name is active.
    Active(String),
    /// File content has the given CRC-32C.
    Checksum(String, u32),
    /// Installed version compares as specified against the given version.
    Version(String, String, Comparator),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Parse a complete condition expression.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first point the input stopped
/// matching the grammar.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    match all_consuming(ws(or_expr))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(e) => Err(ParseError {
            message: e.to_string(),
        }),
    }
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn or_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(ws(tag("or")), and_expr))(input)?;
    Ok((input, fold_binary(first, rest, |a, b| {
        Expr::Or(Box::new(a), Box::new(b))
    })))
}

fn and_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(preceded(ws(tag("and")), unary))(input)?;
    Ok((input, fold_binary(first, rest, |a, b| {
        Expr::And(Box::new(a), Box::new(b))
    })))
}

fn fold_binary(first: Expr, rest: Vec<Expr>, join: impl Fn(Expr, Expr) -> Expr) -> Expr {
    rest.into_iter().fold(first, join)
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(tag("not")), unary), |e| Expr::Not(Box::new(e))),
        delimited(ws(char('(')), or_expr, ws(char(')'))),
        predicate,
    ))(input)
}

fn predicate(input: &str) -> IResult<&str, Expr> {
    alt((file_pred, active_pred, checksum_pred, version_pred))(input)
}

fn file_pred(input: &str) -> IResult<&str, Expr> {
    let (input, _) = tag("file")(input)?;
    let (input, name) = delimited(ws(char('(')), quoted, ws(char(')')))(input)?;
    Ok((input, Expr::File(name)))
}

fn active_pred(input: &str) -> IResult<&str, Expr> {
    let (input, _) = tag("active")(input)?;
    let (input, name) = delimited(ws(char('(')), quoted, ws(char(')')))(input)?;
    Ok((input, Expr::Active(name)))
}

fn checksum_pred(input: &str) -> IResult<&str, Expr> {
    let (input, _) = tag("checksum")(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, name) = quoted(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, checksum) = hex_u32(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, Expr::Checksum(name, checksum)))
}

fn version_pred(input: &str) -> IResult<&str, Expr> {
    let (input, _) = tag("version")(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, name) = quoted(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, wanted) = quoted(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, cmp) = comparator(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, Expr::Version(name, wanted, cmp)))
}

fn quoted(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        |s: &str| s.to_string(),
    )(input)
}

fn hex_u32(input: &str) -> IResult<&str, u32> {
    map_res(preceded(opt(tag("0x")), hex_digit1), |digits: &str| {
        u32::from_str_radix(digits, 16)
    })(input)
}

fn comparator(input: &str) -> IResult<&str, Comparator> {
    // Two-character operators first.
    alt((
        value(Comparator::Le, tag("<=")),
        value(Comparator::Ge, tag(">=")),
        value(Comparator::Ne, tag("!=")),
        value(Comparator::Eq, tag("==")),
        value(Comparator::Lt, tag("<")),
        value(Comparator::Gt, tag(">")),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_predicate() {
        let expr = parse("file(\"Foo.esp\")").unwrap();
        assert_eq!(expr, Expr::File("Foo.esp".into()));
    }

    #[test]
    fn parses_active_predicate() {
        let expr = parse("active(\"Foo.esp\")").unwrap();
        assert_eq!(expr, Expr::Active("Foo.esp".into()));
    }

    #[test]
    fn parses_checksum_with_and_without_prefix() {
        assert_eq!(
            parse("checksum(\"Foo.esp\", DEADBEEF)").unwrap(),
            Expr::Checksum("Foo.esp".into(), 0xDEAD_BEEF)
        );
        assert_eq!(
            parse("checksum(\"Foo.esp\", 0x0000002A)").unwrap(),
            Expr::Checksum("Foo.esp".into(), 42)
        );
    }

    #[test]
    fn parses_version_predicate() {
        let expr = parse("version(\"Foo.esp\", \"1.2\", >=)").unwrap();
        assert_eq!(
            expr,
            Expr::Version("Foo.esp".into(), "1.2".into(), Comparator::Ge)
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("file(\"a\") and file(\"b\") or file(\"c\")").unwrap();
        match expr {
            Expr::Or(lhs, rhs) => {
                assert!(matches!(*lhs, Expr::And(_, _)));
                assert_eq!(*rhs, Expr::File("c".into()));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn not_and_parentheses() {
        let expr = parse("not ( file(\"a\") or active(\"b\") )").unwrap();
        assert!(matches!(expr, Expr::Not(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("file(").is_err());
        assert!(parse("file(\"a\") trailing").is_err());
        assert!(parse("exists(\"a\")").is_err());
        assert!(parse("checksum(\"a\", XYZ)").is_err());
    }

    #[test]
    fn comparator_semantics() {
        let a = Version::new("1.2");
        let b = Version::new("1.10");
        assert!(Comparator::Lt.compare(&a, &b));
        assert!(Comparator::Ne.compare(&a, &b));
        assert!(!Comparator::Ge.compare(&a, &b));
        assert!(Comparator::Eq.compare(&a, &Version::new("1.2.0")));
    }
}
