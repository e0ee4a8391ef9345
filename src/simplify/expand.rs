//! Distribution of products over sums and expansion of integer powers of sums.

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive};
use tracing::debug;

use crate::expr::{Expr, Kind};
use crate::simplify::reduce::reduce;

/// Largest exponent the multinomial expansion will unroll.
pub const EXPAND_EXPONENT_LIMIT: u32 = 1024;

/// Expand products and integer powers of sums, then reduce.
pub fn expand(expr: Expr) -> Expr {
    match expr.kind() {
        Kind::Fraction => reduce(expr),
        kind if kind.is_terminal() => expr,
        Kind::Subtraction | Kind::Division | Kind::SquareRoot => {
            let reduced = reduce(expr);
            if reduced.kind().is_terminal() {
                reduced
            } else {
                expand(reduced)
            }
        }
        Kind::Factorial => reduce(expr),
        Kind::Power => expand_power(expr),
        Kind::Product => {
            let mut factors = expr.into_operands().into_iter().map(expand);
            let Some(first) = factors.next() else {
                return Expr::integer(1);
            };
            let expanded = factors.fold(first, |acc, next| distribute(&acc, &next));
            reduce(expanded)
        }
        _ => reduce(expr.map_operands(expand)),
    }
}

fn expand_power(expr: Expr) -> Expr {
    let expr = reduce(expr.map_operands(expand));
    if !expr.is(Kind::Power) {
        return expand(expr);
    }
    let (base, exp) = (expr.operand(0), expr.operand(1));
    if !base.is(Kind::Sum) {
        return expr;
    }
    let Some(n) = exp.as_integer() else {
        return expr;
    };
    let Some(magnitude) = n.abs().to_u32().filter(|m| *m <= EXPAND_EXPONENT_LIMIT) else {
        debug!(exponent = %n, "exponent too large to expand");
        return expr;
    };
    let expanded = multinomial(base.operands(), magnitude);
    if n.is_negative() {
        reduce(Expr::power(expanded, Expr::integer(-1)))
    } else {
        expanded
    }
}

/// `(t0 + t1 + ... )^n` by splitting off the first term:
/// `(f + r)^n = sum over k of C(n, k) * f^(n-k) * r^k`.
fn multinomial(terms: &[Expr], n: u32) -> Expr {
    let Some((first, rest)) = terms.split_first() else {
        return Expr::integer(0);
    };
    let rest = match rest {
        [] => return reduce(Expr::power(first.clone(), Expr::integer(n))),
        [single] => single.clone(),
        _ => Expr::sum(rest.to_vec()),
    };
    let rest_is_sum = rest.is(Kind::Sum);

    let mut expansion = Vec::with_capacity(n as usize + 1);
    let mut binomial = BigInt::one();
    let mut rest_power = Expr::integer(1);
    for k in 0..=n {
        if k > 0 {
            rest_power = if rest_is_sum {
                distribute(&rest_power, &rest)
            } else {
                reduce(Expr::product(vec![rest_power, rest.clone()]))
            };
        }
        let head = reduce(Expr::product(vec![
            Expr::integer(binomial.clone()),
            Expr::power(first.clone(), Expr::integer(n - k)),
        ]));
        expansion.push(distribute(&head, &rest_power));
        binomial = binomial * (n - k) / (k + 1);
    }
    reduce(Expr::sum(expansion))
}

/// Multiply two expanded expressions, distributing over any Sum operand.
fn distribute(a: &Expr, b: &Expr) -> Expr {
    let xs = summands(a);
    let ys = summands(b);
    if xs.len() == 1 && ys.len() == 1 {
        return reduce(Expr::product(vec![a.clone(), b.clone()]));
    }
    let mut products = Vec::with_capacity(xs.len() * ys.len());
    for x in xs {
        for y in ys {
            products.push(reduce(Expr::product(vec![x.clone(), y.clone()])));
        }
    }
    reduce(Expr::sum(products))
}

fn summands(expr: &Expr) -> &[Expr] {
    if expr.is(Kind::Sum) {
        expr.operands()
    } else {
        std::slice::from_ref(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, frac, int, mul, pow, sym};

    #[test]
    fn square_of_a_binomial() {
        let (x, y) = (sym("x"), sym("y"));
        let expanded = expand(pow(add(vec![x.clone(), y.clone()]), int(2)));
        let expected = reduce(add(vec![
            pow(x.clone(), int(2)),
            mul(vec![int(2), x, y.clone()]),
            pow(y, int(2)),
        ]));
        assert_eq!(expanded, expected);
    }

    #[test]
    fn products_distribute_over_sums() {
        let (a, b, c) = (sym("a"), sym("b"), sym("c"));
        let expanded = expand(mul(vec![a.clone(), add(vec![b.clone(), c.clone()])]));
        let expected = reduce(add(vec![mul(vec![a.clone(), b]), mul(vec![a, c])]));
        assert_eq!(expanded, expected);
    }

    #[test]
    fn terminal_factors_survive_expansion() {
        let x = sym("x");
        let expanded = expand(mul(vec![int(3), x.clone()]));
        assert_eq!(expanded, mul(vec![int(3), x]));
    }

    #[test]
    fn fraction_leaves_come_back_reduced() {
        assert_eq!(expand(frac(4, 8)), frac(1, 2));
        assert_eq!(expand(frac(1, 0)), Expr::undefined());
        assert_eq!(expand(mul(vec![frac(6, 3)])), int(2));
    }

    #[test]
    fn negative_exponents_wrap_the_expansion() {
        let x = sym("x");
        let expanded = expand(pow(add(vec![x.clone(), int(1)]), int(-2)));
        let inner = reduce(add(vec![pow(x.clone(), int(2)), mul(vec![int(2), x]), int(1)]));
        assert_eq!(expanded, pow(inner, int(-1)));
    }

    #[test]
    fn huge_exponents_are_left_alone() {
        let base = add(vec![sym("x"), int(1)]);
        let e = pow(base.clone(), int(i64::from(EXPAND_EXPONENT_LIMIT) + 1));
        assert_eq!(expand(e.clone()), reduce(e));
    }
}
