use crate::error::{CasError, Result};
use crate::expr::{Expr, Kind};
use nom::IResult;
use nom::branch::alt;
use nom::character::complete::{alpha1, alphanumeric0, char, digit1, multispace0};
use nom::combinator::{all_consuming, map, map_res, recognize};
use nom::error::{VerboseError, convert_error};
use nom::multi::{fold_many0, many0_count, separated_list0};
use nom::sequence::{delimited, pair, preceded};
use num_bigint::BigInt;

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Parse infix text into an unreduced expression tree.
pub fn parse_expr(input: &str) -> Result<Expr> {
    match all_consuming(ws(parse_add_sub))(input) {
        Ok((_, expr)) => lower_builtins(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(CasError::Parse(convert_error(input, e)))
        }
        Err(nom::Err::Incomplete(_)) => Err(CasError::Parse("incomplete input".into())),
    }
}

fn parse_add_sub(input: &str) -> PResult<'_, Expr> {
    let (rest, init) = parse_mul_div(input)?;
    fold_many0(
        pair(ws(alt((char('+'), char('-')))), parse_mul_div),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '+' => extend(acc, Kind::Sum, rhs),
            _ => extend(acc, Kind::Subtraction, rhs),
        },
    )(rest)
}

fn parse_mul_div(input: &str) -> PResult<'_, Expr> {
    let (rest, init) = parse_unary(input)?;
    fold_many0(
        pair(ws(alt((char('*'), char('/')))), parse_unary),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '*' => extend(acc, Kind::Product, rhs),
            _ => Expr::division(acc, rhs),
        },
    )(rest)
}

/// Append `rhs` to an n-ary chain started by the same operator, or start one.
fn extend(acc: Expr, kind: Kind, rhs: Expr) -> Expr {
    if acc.is(kind) {
        let mut acc = acc;
        acc.operands_mut().push(rhs);
        acc
    } else {
        Expr::compound(kind, vec![acc, rhs])
    }
}

fn parse_unary(input: &str) -> PResult<'_, Expr> {
    if let Ok((rest, expr)) = preceded(ws(char('-')), parse_unary)(input) {
        let negated = match expr.as_integer() {
            Some(value) => Expr::integer(-value),
            None => expr.negate(),
        };
        Ok((rest, negated))
    } else {
        parse_pow(input)
    }
}

fn parse_pow(input: &str) -> PResult<'_, Expr> {
    let (rest, base) = parse_postfix(input)?;
    if let Ok((next, exp)) = preceded(ws(char('^')), parse_unary)(rest) {
        Ok((next, Expr::power(base, exp)))
    } else {
        Ok((rest, base))
    }
}

fn parse_postfix(input: &str) -> PResult<'_, Expr> {
    let (rest, operand) = parse_primary(input)?;
    let (rest, bangs) = many0_count(ws(char('!')))(rest)?;
    let expr = (0..bangs).fold(operand, |acc, _| Expr::factorial(acc));
    Ok((rest, expr))
}

fn parse_primary(input: &str) -> PResult<'_, Expr> {
    alt((parse_parens, parse_call, parse_number, parse_atom))(input)
}

fn parse_parens(input: &str) -> PResult<'_, Expr> {
    delimited(ws(char('(')), parse_add_sub, ws(char(')')))(input)
}

fn parse_call(input: &str) -> PResult<'_, Expr> {
    map(
        pair(
            parse_name,
            delimited(
                ws(char('(')),
                separated_list0(ws(char(',')), parse_add_sub),
                ws(char(')')),
            ),
        ),
        |(name, args)| Expr::call(name, args),
    )(input)
}

fn parse_number(input: &str) -> PResult<'_, Expr> {
    map(
        map_res(ws(digit1), |s: &str| s.parse::<BigInt>()),
        |value: BigInt| Expr::integer(value),
    )(input)
}

fn parse_atom(input: &str) -> PResult<'_, Expr> {
    map(parse_name, |name| match name {
        "inf" => Expr::infinity(),
        "undefined" => Expr::undefined(),
        "fail" => Expr::fail(),
        _ => Expr::symbol(name),
    })(input)
}

fn parse_name(input: &str) -> PResult<'_, &str> {
    ws(recognize(pair(alpha1, alphanumeric0)))(input)
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Turn calls of built-in operators into their dedicated node kinds.
fn lower_builtins(mut expr: Expr) -> Result<Expr> {
    if expr.is_terminal() {
        return Ok(expr);
    }
    for idx in 0..expr.size() {
        let child = lower_builtins(expr.operand(idx).clone())?;
        if !child.ptr_eq(expr.operand(idx)) {
            expr.set_operand(idx, child);
        }
    }
    if expr.is(Kind::FunctionCall) && expr.identifier() == "sqrt" {
        if expr.size() != 1 {
            return Err(CasError::Arity {
                name: "sqrt",
                expected: 1,
                found: expr.size(),
            });
        }
        return Ok(Expr::sqrt(expr.operand(0).clone()));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, div, int, mul, pow, sub, sym};

    #[test]
    fn chains_become_n_ary_nodes() {
        let e = parse_expr("a + b + c").unwrap();
        assert_eq!(e, add(vec![sym("a"), sym("b"), sym("c")]));
        let e = parse_expr("a*b*c").unwrap();
        assert_eq!(e, mul(vec![sym("a"), sym("b"), sym("c")]));
        let e = parse_expr("a - b - c").unwrap();
        assert_eq!(e, sub(vec![sym("a"), sym("b"), sym("c")]));
    }

    #[test]
    fn powers_are_right_associative_and_bind_tighter_than_minus() {
        let e = parse_expr("2^3^2").unwrap();
        assert_eq!(e, pow(int(2), pow(int(3), int(2))));
        let e = parse_expr("-x^2").unwrap();
        assert_eq!(e, mul(vec![int(-1), pow(sym("x"), int(2))]));
        let e = parse_expr("2^-1").unwrap();
        assert_eq!(e, pow(int(2), int(-1)));
    }

    #[test]
    fn division_is_binary() {
        let e = parse_expr("a / b / c").unwrap();
        assert_eq!(e, div(div(sym("a"), sym("b")), sym("c")));
    }

    #[test]
    fn calls_roots_and_factorials() {
        let e = parse_expr("f(x, 2)").unwrap();
        assert_eq!(e, Expr::call("f", vec![sym("x"), int(2)]));
        let e = parse_expr("sqrt(x + 1)").unwrap();
        assert_eq!(e, Expr::sqrt(add(vec![sym("x"), int(1)])));
        let e = parse_expr("n!").unwrap();
        assert_eq!(e, Expr::factorial(sym("n")));
        let e = parse_expr("(n + 1)!").unwrap();
        assert_eq!(e, Expr::factorial(add(vec![sym("n"), int(1)])));
    }

    #[test]
    fn keywords() {
        assert_eq!(parse_expr("inf").unwrap(), Expr::infinity());
        assert_eq!(parse_expr("undefined").unwrap(), Expr::undefined());
        assert_eq!(parse_expr("fail").unwrap(), Expr::fail());
        assert_eq!(parse_expr("-inf").unwrap(), mul(vec![int(-1), Expr::infinity()]));
    }

    #[test]
    fn errors() {
        assert!(matches!(parse_expr("1 +"), Err(CasError::Parse(_))));
        assert!(matches!(parse_expr("(x"), Err(CasError::Parse(_))));
        assert!(matches!(parse_expr("sqrt(x, y)"), Err(CasError::Arity { found: 2, .. })));
    }
}
