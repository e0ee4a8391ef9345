//! Exact arithmetic on Integer and Fraction nodes.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{Expr, Kind};

/// Numerator and denominator of a constant, denominator made positive.
fn parts(expr: &Expr) -> (BigInt, BigInt) {
    match expr.kind() {
        Kind::Integer => (expr.value().clone(), BigInt::one()),
        Kind::Fraction => {
            let num = expr.operand(0).value().clone();
            let den = expr.operand(1).value().clone();
            assert!(!den.is_zero(), "fraction with a zero denominator");
            if den.is_negative() {
                (-num, -den)
            } else {
                (num, den)
            }
        }
        other => panic!("expected a constant, found a {} node", other.label()),
    }
}

/// Build the canonical constant `num/den`: lowest terms, positive denominator,
/// Integer when the denominator divides.
pub fn make_fraction(num: BigInt, den: BigInt) -> Expr {
    assert!(!den.is_zero(), "fraction with a zero denominator");
    let g = num.gcd(&den);
    let (mut num, mut den) = if g.is_one() || g.is_zero() {
        (num, den)
    } else {
        (num / &g, den / &g)
    };
    if den.is_negative() {
        num = -num;
        den = -den;
    }
    if den.is_one() {
        Expr::integer(num)
    } else {
        Expr::fraction(num, den)
    }
}

pub fn add_constants(a: &Expr, b: &Expr) -> Expr {
    if let (Some(x), Some(y)) = (a.as_integer(), b.as_integer()) {
        return Expr::integer(x + y);
    }
    let (an, ad) = parts(a);
    let (bn, bd) = parts(b);
    make_fraction(an * &bd + bn * &ad, ad * bd)
}

pub fn mul_constants(a: &Expr, b: &Expr) -> Expr {
    if let (Some(x), Some(y)) = (a.as_integer(), b.as_integer()) {
        return Expr::integer(x * y);
    }
    let (an, ad) = parts(a);
    let (bn, bd) = parts(b);
    make_fraction(an * bn, ad * bd)
}

/// Numeric order of two constants by cross multiplication.
pub fn compare_constants(a: &Expr, b: &Expr) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_integer(), b.as_integer()) {
        return x.cmp(y);
    }
    let (an, ad) = parts(a);
    let (bn, bd) = parts(b);
    (an * bd).cmp(&(bn * ad))
}

/// `base^exp` for a constant base.
///
/// Returns `None` when the exponent is too large to evaluate and the power has
/// to stay symbolic.
pub fn pow_constant(base: &Expr, exp: &BigInt) -> Option<Expr> {
    let (num, den) = parts(base);
    if exp.is_zero() {
        return Some(Expr::integer(1));
    }
    if num.is_zero() {
        return Some(if exp.is_negative() {
            Expr::undefined()
        } else {
            Expr::integer(0)
        });
    }
    let magnitude = match exp.abs().to_u32() {
        Some(m) => m,
        None if den.is_one() && num.abs().is_one() => {
            let odd = exp.is_odd();
            return Some(Expr::integer(if num.is_negative() && odd { -1 } else { 1 }));
        }
        None => return None,
    };
    let (num, den) = (num.pow(magnitude), den.pow(magnitude));
    Some(if exp.is_negative() {
        make_fraction(den, num)
    } else {
        make_fraction(num, den)
    })
}

/// `n!` for a non-negative `n` small enough to evaluate.
pub fn factorial(n: &BigInt) -> Option<BigInt> {
    if n.is_negative() {
        return None;
    }
    let n = n.to_u32()?;
    Some((2..=n).fold(BigInt::one(), |acc, k| acc * k))
}
