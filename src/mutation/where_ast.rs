//! The restricted boolean grammar `UpdateWhere`/`DeleteWhere` accept:
//! equality, `IN`, `LIKE`, combined with `AND`/`OR`/`NOT` and `?`
//! placeholders bound positionally from a caller-supplied argument slice.
//! Whitelisted columns are dimension names, `uuid`, `title`, `body`.
//!
//! Grammar (case-insensitive keywords):
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr ("OR" and_expr)*
//! and_expr   := unary ("AND" unary)*
//! unary      := "NOT" unary | "(" expr ")" | comparison
//! comparison := ident "=" "?"
//!             | ident "LIKE" "?"
//!             | ident "IN" "(" "?" ("," "?")* ")"
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, multispace0},
    combinator::all_consuming,
    multi::separated_list1,
    sequence::delimited,
    IResult,
};

use crate::core::config::{Config, DimensionKind};
use crate::core::error::{Error, Result};
use crate::core::types::{Document, DimensionValue};

/// A parsed where-expression. Placeholder values aren't resolved here --
/// each comparison just records which positional argument it wants, so the
/// same parsed expression can be reused against different argument slices.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereExpr {
    Eq(String, usize),
    Like(String, usize),
    In(String, Vec<usize>),
    And(Box<WhereExpr>, Box<WhereExpr>),
    Or(Box<WhereExpr>, Box<WhereExpr>),
    Not(Box<WhereExpr>),
}

const WHITELISTED_PSEUDO_COLUMNS: &[&str] = &["uuid", "title", "body"];

/// Parse a where-expression. Fails on anything outside the grammar above --
/// an empty expression is rejected by the caller before this is invoked.
pub fn parse(input: &str) -> Result<WhereExpr> {
    if input.trim().is_empty() {
        return Err(Error::input("where expression is empty"));
    }

    let mut placeholder_count = 0usize;
    let (rest, expr) = all_consuming(|i| or_expr(i, &mut placeholder_count))(input)
        .map_err(|e| Error::input(format!("malformed where expression '{}': {}", input, e)))?;
    debug_assert!(rest.is_empty());
    Ok(expr)
}

/// Check every column name mentioned resolves against the schema (a
/// dimension name or `uuid`/`title`/`body`), and that enough `?` arguments
/// were supplied to cover every placeholder.
pub fn validate(expr: &WhereExpr, config: &Config, params_len: usize) -> Result<()> {
    match expr {
        WhereExpr::Eq(col, idx) | WhereExpr::Like(col, idx) => {
            check_column(col, config)?;
            check_index(*idx, params_len)
        }
        WhereExpr::In(col, idxs) => {
            check_column(col, config)?;
            idxs.iter().try_for_each(|idx| check_index(*idx, params_len))
        }
        WhereExpr::And(a, b) | WhereExpr::Or(a, b) => {
            validate(a, config, params_len)?;
            validate(b, config, params_len)
        }
        WhereExpr::Not(inner) => validate(inner, config, params_len),
    }
}

fn check_column(col: &str, config: &Config) -> Result<()> {
    if WHITELISTED_PSEUDO_COLUMNS.contains(&col) || config.dimension(col).is_some() {
        Ok(())
    } else {
        Err(Error::config(format!("unknown column '{}' in where expression", col)))
    }
}

fn check_index(idx: usize, params_len: usize) -> Result<()> {
    if idx < params_len {
        Ok(())
    } else {
        Err(Error::input(format!(
            "where expression references argument #{} but only {} were supplied",
            idx + 1,
            params_len
        )))
    }
}

/// Evaluate an already-validated expression against one document.
pub fn eval(expr: &WhereExpr, doc: &Document, config: &Config, args: &[String]) -> bool {
    match expr {
        WhereExpr::Eq(col, idx) => field_value(doc, config, col) == args[*idx],
        WhereExpr::Like(col, idx) => like_match(&field_value(doc, config, col), &args[*idx]),
        WhereExpr::In(col, idxs) => {
            let value = field_value(doc, config, col);
            idxs.iter().any(|idx| args[*idx] == value)
        }
        WhereExpr::And(a, b) => eval(a, doc, config, args) && eval(b, doc, config, args),
        WhereExpr::Or(a, b) => eval(a, doc, config, args) || eval(b, doc, config, args),
        WhereExpr::Not(inner) => !eval(inner, doc, config, args),
    }
}

fn field_value(doc: &Document, config: &Config, col: &str) -> String {
    match col {
        "uuid" => doc.uuid.to_string(),
        "title" => doc.title.clone(),
        "body" => doc.body.clone(),
        dim => doc
            .dimension(dim)
            .and_then(DimensionValue::as_str)
            .map(|s| s.to_string())
            .unwrap_or_else(|| default_value(config, dim)),
    }
}

fn default_value(config: &Config, dim_name: &str) -> String {
    match config.dimension(dim_name).map(|d| &d.kind) {
        Some(DimensionKind::Enumerated { default, .. }) => default.clone().unwrap_or_default(),
        _ => String::new(),
    }
}

/// SQL-style `LIKE`: `%` matches any run of characters, `_` matches exactly
/// one. Case-insensitive, matching the substring-search rule used elsewhere
/// in the query engine.
fn like_match(haystack: &str, pattern: &str) -> bool {
    fn matches(h: &[char], p: &[char]) -> bool {
        match p.first() {
            None => h.is_empty(),
            Some('%') => matches(h, &p[1..]) || (!h.is_empty() && matches(&h[1..], p)),
            Some('_') => !h.is_empty() && matches(&h[1..], &p[1..]),
            Some(c) => h.first().map(|hc| hc == c).unwrap_or(false) && matches(&h[1..], &p[1..]),
        }
    }

    let h: Vec<char> = haystack.to_lowercase().chars().collect();
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    matches(&h, &p)
}

// -- parser ----------------------------------------------------------------

fn ws<'a, F, O>(mut inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    move |input: &'a str| {
        let (input, _) = multispace0(input)?;
        let (input, out) = inner(input)?;
        let (input, _) = multispace0(input)?;
        Ok((input, out))
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn placeholder<'a>(input: &'a str, counter: &mut usize) -> IResult<&'a str, usize> {
    let (input, _) = char('?')(input)?;
    let idx = *counter;
    *counter += 1;
    Ok((input, idx))
}

fn comparison<'a>(input: &'a str, counter: &mut usize) -> IResult<&'a str, WhereExpr> {
    let (input, col) = ws(identifier)(input)?;
    let (input, op) = ws(alt((tag("="), tag_no_case("LIKE"), tag_no_case("IN"))))(input)?;

    match op.to_ascii_uppercase().as_str() {
        "=" => {
            let (input, idx) = ws(|i| placeholder(i, counter))(input)?;
            Ok((input, WhereExpr::Eq(col.to_string(), idx)))
        }
        "LIKE" => {
            let (input, idx) = ws(|i| placeholder(i, counter))(input)?;
            Ok((input, WhereExpr::Like(col.to_string(), idx)))
        }
        _ => {
            let (input, idxs) = delimited(
                ws(char('(')),
                separated_list1(ws(char(',')), |i| placeholder(i, counter)),
                ws(char(')')),
            )(input)?;
            Ok((input, WhereExpr::In(col.to_string(), idxs)))
        }
    }
}

fn unary<'a>(input: &'a str, counter: &mut usize) -> IResult<&'a str, WhereExpr> {
    if let Ok((input, _)) = ws(tag_no_case("NOT"))(input) {
        let (input, inner) = unary(input, counter)?;
        return Ok((input, WhereExpr::Not(Box::new(inner))));
    }

    if let Ok((input, _)) = ws(char::<&str, nom::error::Error<&str>>('('))(input) {
        let (input, inner) = or_expr(input, counter)?;
        let (input, _) = ws(char(')'))(input)?;
        return Ok((input, inner));
    }

    comparison(input, counter)
}

fn and_expr<'a>(input: &'a str, counter: &mut usize) -> IResult<&'a str, WhereExpr> {
    let (mut input, mut lhs) = unary(input, counter)?;
    loop {
        match ws(tag_no_case::<&str, &str, nom::error::Error<&str>>("AND"))(input) {
            Ok((rest, _)) => {
                let (rest, rhs) = unary(rest, counter)?;
                lhs = WhereExpr::And(Box::new(lhs), Box::new(rhs));
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, lhs))
}

fn or_expr<'a>(input: &'a str, counter: &mut usize) -> IResult<&'a str, WhereExpr> {
    let (mut input, mut lhs) = and_expr(input, counter)?;
    loop {
        match ws(tag_no_case::<&str, &str, nom::error::Error<&str>>("OR"))(input) {
            Ok((rest, _)) => {
                let (rest, rhs) = and_expr(rest, counter)?;
                lhs = WhereExpr::Or(Box::new(lhs), Box::new(rhs));
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, lhs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_equality() {
        let expr = parse("status = ?").unwrap();
        assert_eq!(expr, WhereExpr::Eq("status".into(), 0));
    }

    #[test]
    fn parses_and_or_not_with_precedence() {
        let expr = parse("status = ? OR NOT priority = ? AND title LIKE ?").unwrap();
        // AND binds tighter than OR: status=? OR (NOT priority=? AND title LIKE ?)
        match expr {
            WhereExpr::Or(lhs, rhs) => {
                assert_eq!(*lhs, WhereExpr::Eq("status".into(), 0));
                assert!(matches!(*rhs, WhereExpr::And(_, _)));
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn parses_in_list() {
        let expr = parse("status IN (?, ?, ?)").unwrap();
        assert_eq!(expr, WhereExpr::In("status".into(), vec![0, 1, 2]));
    }

    #[test]
    fn empty_expression_is_rejected() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn like_wildcards() {
        assert!(like_match("hello world", "%world"));
        assert!(like_match("hello world", "hello_world"));
        assert!(!like_match("hello", "world"));
    }
}
