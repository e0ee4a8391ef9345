//! Canonical ordering of expressions.
//!
//! The order depends on the context the operands live in. Inside a product,
//! numbers lead and factors group by base; inside a sum, numbers trail and terms
//! group by everything except their numeric coefficient. Both groupings keep
//! like terms adjacent after sorting, which is what the merge engine relies on.

use std::cmp::Ordering;

use crate::expr::{Expr, Kind, one};
use crate::simplify::constant::compare_constants;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Context {
    Sum,
    Product,
    Neutral,
}

impl Context {
    pub fn of(kind: Kind) -> Self {
        match kind {
            Kind::Sum => Context::Sum,
            Kind::Product => Context::Product,
            _ => Context::Neutral,
        }
    }
}

pub fn compare(a: &Expr, b: &Expr, ctx: Context) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    match (a.is_constant(), b.is_constant()) {
        (true, true) => return compare_constants(a, b),
        (true, false) => {
            return if ctx == Context::Sum {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, true) => {
            return if ctx == Context::Sum {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, false) => {}
    }
    match ctx {
        Context::Product => compare_factors(a, b),
        Context::Sum => compare_terms(a, b),
        Context::Neutral => compare_structure(a, b, Context::Neutral),
    }
}

/// Inside a product: a product is read as its factors from the trailing end,
/// anything else as a single factor.
fn compare_factors(a: &Expr, b: &Expr) -> Ordering {
    if !a.is(Kind::Product) && !b.is(Kind::Product) {
        return compare_power_key(a, b);
    }
    let xs = factor_view(a);
    let ys = factor_view(b);
    for (x, y) in xs.iter().rev().zip(ys.iter().rev()) {
        let ord = compare(x, y, Context::Product);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    xs.len().cmp(&ys.len())
}

fn factor_view(expr: &Expr) -> &[Expr] {
    if expr.is(Kind::Product) {
        expr.operands()
    } else {
        std::slice::from_ref(expr)
    }
}

fn compare_power_key(a: &Expr, b: &Expr) -> Ordering {
    compare_bases(base(a), base(b)).then_with(|| compare_exponents(exponent(a), exponent(b)))
}

fn compare_bases(a: &Expr, b: &Expr) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    match (a.is_constant(), b.is_constant()) {
        (true, true) => compare_constants(a, b),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ if a.is(Kind::Product) || b.is(Kind::Product) => compare_factors(a, b),
        _ if a.is(Kind::Power) || b.is(Kind::Power) => compare_power_key(a, b),
        _ => compare_structure(a, b, Context::Product),
    }
}

fn compare_exponents(a: Option<&Expr>, b: Option<&Expr>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(x), Some(y)) => compare(x, y, Context::Neutral),
        (Some(x), None) => compare(x, &one(), Context::Neutral),
        (None, Some(y)) => compare(&one(), y, Context::Neutral),
    }
}

/// Base of a power, otherwise the node itself.
pub fn base(expr: &Expr) -> &Expr {
    if expr.is(Kind::Power) {
        expr.operand(0)
    } else {
        expr
    }
}

/// Exponent of a power; `None` stands for the implicit exponent 1.
pub fn exponent(expr: &Expr) -> Option<&Expr> {
    if expr.is(Kind::Power) {
        Some(expr.operand(1))
    } else {
        None
    }
}

/// Leading numeric coefficient of a product term and the factors after it.
pub fn split_coefficient(expr: &Expr) -> (Option<&Expr>, &[Expr]) {
    if expr.is(Kind::Product) {
        match expr.operands().split_first() {
            Some((first, rest)) if first.is_constant() => (Some(first), rest),
            _ => (None, expr.operands()),
        }
    } else {
        (None, std::slice::from_ref(expr))
    }
}

/// Inside a sum: the term part decides, the coefficient breaks ties.
fn compare_terms(a: &Expr, b: &Expr) -> Ordering {
    let (ca, ta) = split_coefficient(a);
    let (cb, tb) = split_coefficient(b);
    compare_term_parts(ta, tb).then_with(|| match (ca, cb) {
        (None, None) => Ordering::Equal,
        (Some(x), Some(y)) => compare_constants(x, y),
        (Some(x), None) => compare_constants(x, &one()),
        (None, Some(y)) => compare_constants(&one(), y),
    })
}

fn compare_term_parts(xs: &[Expr], ys: &[Expr]) -> Ordering {
    if xs.len() != ys.len() {
        return xs.len().cmp(&ys.len());
    }
    for (x, y) in xs.iter().rev().zip(ys.iter().rev()) {
        let ord = compare_monomials(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn compare_monomials(a: &Expr, b: &Expr) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    compare_exponents(exponent(a), exponent(b))
        .then_with(|| compare_structure(base(a), base(b), Context::Sum))
}

/// Structural order used once the context-specific rules have nothing to say.
fn compare_structure(a: &Expr, b: &Expr, ctx: Context) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    if a.is_constant() && b.is_constant() {
        return compare_constants(a, b);
    }
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb {
        return if ctx == Context::Sum {
            ra.cmp(&rb)
        } else {
            rb.cmp(&ra)
        };
    }
    match a.kind() {
        Kind::Symbol => a.identifier().cmp(b.identifier()),
        Kind::FunctionCall => a
            .identifier()
            .cmp(b.identifier())
            .then_with(|| compare_operands(a.operands(), b.operands(), Context::Neutral, ctx)),
        kind if kind.is_terminal() => Ordering::Equal,
        kind => compare_operands(a.operands(), b.operands(), Context::of(kind), ctx),
    }
}

// Constants share one rank so that numeric order and kind order never disagree.
fn rank(expr: &Expr) -> u8 {
    if expr.is_constant() {
        Kind::Integer.priority()
    } else {
        expr.kind().priority()
    }
}

fn compare_operands(xs: &[Expr], ys: &[Expr], inner: Context, outer: Context) -> Ordering {
    for (x, y) in xs.iter().rev().zip(ys.iter().rev()) {
        let ord = compare(x, y, inner);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    if outer == Context::Sum {
        xs.len().cmp(&ys.len())
    } else {
        ys.len().cmp(&xs.len())
    }
}

/// Like terms of a sum: equal once their numeric coefficients are set aside.
pub fn same_term(a: &Expr, b: &Expr) -> bool {
    if a.is_constant() || b.is_constant() {
        return false;
    }
    if !a.kind().is_summable() || !b.kind().is_summable() {
        return false;
    }
    let (_, ta) = split_coefficient(a);
    let (_, tb) = split_coefficient(b);
    !ta.is_empty() && compare_term_parts(ta, tb) == Ordering::Equal
}

/// Like factors of a product: powers of the same base.
pub fn same_base(a: &Expr, b: &Expr) -> bool {
    if a.is_constant() || b.is_constant() {
        return false;
    }
    if !a.kind().is_multiplicable() || !b.kind().is_multiplicable() {
        return false;
    }
    compare_bases(base(a), base(b)) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, frac, int, mul, pow, sym};

    fn lt(a: &Expr, b: &Expr, ctx: Context) {
        assert_eq!(compare(a, b, ctx), Ordering::Less, "{a:?} < {b:?} in {ctx:?}");
        assert_eq!(compare(b, a, ctx), Ordering::Greater, "{b:?} > {a:?} in {ctx:?}");
    }

    #[test]
    fn constants_lead_products_and_trail_sums() {
        let x = sym("x");
        lt(&int(3), &x, Context::Product);
        lt(&x, &int(3), Context::Sum);
        lt(&frac(1, 2), &int(1), Context::Sum);
        lt(&int(-4), &frac(1, 3), Context::Product);
    }

    #[test]
    fn symbols_order_by_name() {
        lt(&sym("a"), &sym("b"), Context::Sum);
        lt(&sym("a"), &sym("b"), Context::Product);
        lt(&sym("a"), &sym("b"), Context::Neutral);
    }

    #[test]
    fn product_groups_by_base_then_exponent() {
        let x = sym("x");
        lt(&x, &pow(x.clone(), int(2)), Context::Product);
        lt(&pow(x.clone(), int(3)), &sym("y"), Context::Product);
        assert!(same_base(&x, &pow(x.clone(), int(2))));
        assert!(!same_base(&x, &sym("y")));
    }

    #[test]
    fn sum_groups_by_term_then_coefficient() {
        let x = sym("x");
        let two_x = mul(vec![int(2), x.clone()]);
        lt(&x, &two_x, Context::Sum);
        assert!(same_term(&x, &two_x));
        let xy = mul(vec![x.clone(), sym("y")]);
        lt(&x, &xy, Context::Sum);
        assert!(same_term(&xy, &mul(vec![int(3), sym("x"), sym("y")])));
        assert!(!same_term(&x, &xy));
    }

    #[test]
    fn sum_compares_exponent_before_base() {
        lt(&sym("y"), &pow(sym("x"), int(2)), Context::Sum);
    }

    #[test]
    fn sums_outrank_symbols_inside_sums() {
        lt(&sym("z"), &add(vec![sym("a"), sym("b")]), Context::Sum);
    }

    #[test]
    fn calls_compare_by_name_then_arguments() {
        let fx = Expr::call("f", vec![sym("x")]);
        let fy = Expr::call("f", vec![sym("y")]);
        let gx = Expr::call("g", vec![sym("x")]);
        lt(&fx, &fy, Context::Neutral);
        lt(&fx, &gx, Context::Neutral);
        assert!(!same_base(&fx, &fy));
        assert!(same_base(&fx, &Expr::call("f", vec![sym("x")])));
    }

    #[test]
    fn structurally_equal_nodes_compare_equal() {
        for ctx in [Context::Sum, Context::Product, Context::Neutral] {
            let a = add(vec![mul(vec![int(2), sym("x")]), pow(sym("y"), frac(1, 2))]);
            let b = add(vec![mul(vec![int(2), sym("x")]), pow(sym("y"), frac(1, 2))]);
            assert_eq!(compare(&a, &b, ctx), Ordering::Equal);
        }
    }
}
