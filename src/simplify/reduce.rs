//! Kind-by-kind reduction to arithmetic normal form.

use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use tracing::{debug, trace};

use crate::expr::{Expr, Kind};
use crate::simplify::constant::{factorial, make_fraction, pow_constant};
use crate::simplify::merge::{failure_among, normalize};
use crate::simplify::order::Context;

/// Reduce `expr` bottom-up: operands first, then the rule for its kind.
pub fn reduce(expr: Expr) -> Expr {
    let kind = expr.kind();
    let reduced = match kind {
        Kind::Fraction => reduce_fraction(expr),
        Kind::Sum => reduce_sum(expr),
        Kind::Product => reduce_product(expr),
        Kind::Subtraction => reduce_subtraction(expr),
        Kind::Division => reduce_division(expr),
        Kind::SquareRoot => reduce_sqrt(expr),
        Kind::Power => reduce_power(expr),
        Kind::Factorial => reduce_factorial(expr),
        Kind::FunctionCall => reduce_call(expr),
        _ => return expr,
    };
    trace!(kind = kind.label(), expr = %reduced, "reduced");
    reduced
}

/// Reduce every operand, or return the failure one of them turned into.
fn reduce_operands(expr: Expr) -> Result<Expr, Expr> {
    let expr = expr.map_operands(reduce);
    match failure_among(expr.operands()) {
        Some(failure) => {
            debug!(
                kind = expr.kind().label(),
                failure = failure.kind().label(),
                "failure absorbs node"
            );
            Err(failure)
        }
        None => Ok(expr),
    }
}

fn reduce_fraction(expr: Expr) -> Expr {
    let den = expr.operand(1).value();
    if den.is_zero() {
        debug!("fraction with zero denominator");
        return Expr::undefined();
    }
    make_fraction(expr.operand(0).value().clone(), den.clone())
}

fn reduce_sum(expr: Expr) -> Expr {
    match reduce_operands(expr) {
        Ok(expr) => normalize(expr.into_operands(), Context::Sum),
        Err(failure) => failure,
    }
}

fn reduce_product(expr: Expr) -> Expr {
    let expr = match reduce_operands(expr) {
        Ok(expr) => expr,
        Err(failure) => return failure,
    };
    if expr.operands().iter().any(Expr::is_zero) {
        return Expr::integer(0);
    }
    normalize(expr.into_operands(), Context::Product)
}

fn reduce_subtraction(mut expr: Expr) -> Expr {
    for idx in 1..expr.size() {
        let operand = expr.operand(idx).clone();
        expr.set_operand(idx, operand.negate());
    }
    expr.retag(Kind::Sum);
    reduce(expr)
}

fn reduce_division(mut expr: Expr) -> Expr {
    let den = expr.operand(1).clone();
    expr.set_operand(1, Expr::power(den, Expr::integer(-1)));
    expr.retag(Kind::Product);
    reduce(expr)
}

fn reduce_sqrt(mut expr: Expr) -> Expr {
    expr.operands_mut().push(Expr::fraction(1, 2));
    expr.retag(Kind::Power);
    reduce(expr)
}

fn reduce_power(expr: Expr) -> Expr {
    let expr = match reduce_operands(expr) {
        Ok(expr) => expr,
        Err(failure) => return failure,
    };
    let (base, exp) = (expr.operand(0), expr.operand(1));
    let Some(n) = exp.as_integer() else {
        return expr;
    };
    if n.is_one() {
        return base.clone();
    }
    if n.is_zero() {
        return Expr::integer(1);
    }
    match base.kind() {
        Kind::Integer | Kind::Fraction => pow_constant(base, n).unwrap_or(expr),
        Kind::Power => {
            let inner_exp = reduce(Expr::product(vec![base.operand(1).clone(), exp.clone()]));
            reduce(Expr::power(base.operand(0).clone(), inner_exp))
        }
        Kind::Product => power_of_product(base, n),
        _ => expr,
    }
}

/// `base^n` for a Product base by repeated squaring.
fn power_of_product(base: &Expr, n: &num_bigint::BigInt) -> Expr {
    let mut remaining = n.abs();
    let mut square = base.clone();
    let mut acc: Option<Expr> = None;
    while !remaining.is_zero() {
        if remaining.is_odd() {
            acc = Some(match acc {
                None => square.clone(),
                Some(acc) => reduce(Expr::product(vec![acc, square.clone()])),
            });
        }
        remaining >>= 1;
        if !remaining.is_zero() {
            square = reduce(Expr::product(vec![square.clone(), square]));
        }
    }
    let result = acc.unwrap_or_else(|| Expr::integer(1));
    if n.is_negative() {
        invert(result)
    } else {
        result
    }
}

/// Reciprocal of a reduced expression, taken factor by factor for products.
fn invert(expr: Expr) -> Expr {
    if expr.is(Kind::Product) {
        let factors = expr
            .into_operands()
            .into_iter()
            .map(|f| reduce(Expr::power(f, Expr::integer(-1))))
            .collect();
        reduce(Expr::product(factors))
    } else {
        reduce(Expr::power(expr, Expr::integer(-1)))
    }
}

fn reduce_factorial(expr: Expr) -> Expr {
    let expr = match reduce_operands(expr) {
        Ok(expr) => expr,
        Err(failure) => return failure,
    };
    let arg = expr.operand(0);
    match arg.kind() {
        Kind::Integer if arg.value().is_negative() => {
            debug!("factorial of a negative integer");
            Expr::undefined()
        }
        Kind::Integer => match factorial(arg.value()) {
            Some(value) => Expr::integer(value),
            None => expr,
        },
        Kind::Fraction => {
            let (num, den) = (arg.operand(0).value(), arg.operand(1).value());
            if num.is_negative() {
                debug!("factorial of a negative fraction");
                return Expr::undefined();
            }
            match (factorial(num), factorial(den)) {
                (Some(num), Some(den)) => make_fraction(num, den),
                _ => expr,
            }
        }
        _ => expr,
    }
}

fn reduce_call(expr: Expr) -> Expr {
    reduce_operands(expr).unwrap_or_else(|failure| failure)
}
