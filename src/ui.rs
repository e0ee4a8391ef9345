//! String-based helpers: parse, run a pass, optionally render.

use crate::error::Result;
use crate::expr::Expr;
use crate::format::{debug_dump, pretty};
use crate::parser::parse_expr;
use crate::simplify::{expand as expand_expr, reduce as reduce_expr};

pub fn parse(input: &str) -> Result<Expr> {
    parse_expr(input)
}

pub fn reduce(input: &str) -> Result<Expr> {
    let expr = parse_expr(input)?;
    Ok(reduce_expr(expr))
}

pub fn red(input: &str) -> Result<String> {
    Ok(pretty(&reduce(input)?))
}

pub fn expand(input: &str) -> Result<Expr> {
    let expr = parse_expr(input)?;
    Ok(expand_expr(expr))
}

pub fn expd(input: &str) -> Result<String> {
    Ok(pretty(&expand(input)?))
}

/// Structural dump of the parsed, unreduced tree.
pub fn dump(input: &str) -> Result<String> {
    Ok(debug_dump(&parse_expr(input)?))
}
