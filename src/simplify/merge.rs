//! Merging of sorted Sum and Product operand sequences.
//!
//! Both engines walk sequences already in canonical order and combine the like
//! terms they find next to each other. A combination can produce something that
//! no longer belongs where its inputs stood (`2^(1/2)*2^(1/2)` is the integer 2);
//! such a round is marked unsettled and the sequence is flattened, re-sorted and
//! swept again.

use tracing::trace;

use crate::expr::{Expr, Kind};
use crate::simplify::constant::{add_constants, mul_constants};
use crate::simplify::order::{
    Context, base, compare, exponent, same_base, same_term, split_coefficient,
};
use crate::simplify::reduce::reduce;
use crate::simplify::sort::sort_slice;

pub(crate) struct Merged {
    pub items: Vec<Expr>,
    pub unsettled: bool,
}

/// Combine the normalized sums `u` and `v` into one normalized expression.
///
/// A non-Sum argument is taken as a sum of one term.
pub fn merge_sum(u: &Expr, v: &Expr) -> Expr {
    merge_nodes(u, v, Context::Sum)
}

/// Combine the normalized products `u` and `v` into one normalized expression.
pub fn merge_product(u: &Expr, v: &Expr) -> Expr {
    merge_nodes(u, v, Context::Product)
}

fn merge_nodes(u: &Expr, v: &Expr, ctx: Context) -> Expr {
    let merged = merge_sequences(view(u, ctx), view(v, ctx), ctx);
    let settled = if merged.unsettled {
        settle(merged.items, ctx)
    } else {
        match failure_among(&merged.items) {
            Some(failure) => Err(failure),
            None => Ok(merged.items),
        }
    };
    settled.map_or_else(|failure| failure, |items| build(items, ctx))
}

fn view(expr: &Expr, ctx: Context) -> &[Expr] {
    if expr.is(kind_of(ctx)) {
        expr.operands()
    } else {
        std::slice::from_ref(expr)
    }
}

fn kind_of(ctx: Context) -> Kind {
    match ctx {
        Context::Product => Kind::Product,
        _ => Kind::Sum,
    }
}

/// Merge step of merge sort over two sorted sequences, combining like elements
/// that meet at the cursors.
pub(crate) fn merge_sequences(u: &[Expr], v: &[Expr], ctx: Context) -> Merged {
    let mut items = Vec::with_capacity(u.len() + v.len());
    let mut unsettled = false;
    let (mut i, mut j) = (0, 0);
    while i < u.len() && j < v.len() {
        let (a, b) = (&u[i], &v[j]);
        if let Some(combined) = combine(a, b, ctx) {
            unsettled |= !settles(a, &combined, ctx);
            items.push(combined);
            i += 1;
            j += 1;
        } else if compare(a, b, ctx) == std::cmp::Ordering::Greater {
            items.push(b.clone());
            j += 1;
        } else {
            items.push(a.clone());
            i += 1;
        }
    }
    items.extend_from_slice(&u[i..]);
    items.extend_from_slice(&v[j..]);
    Merged { items, unsettled }
}

/// One sweep over adjacent elements of a sorted sequence.
pub(crate) fn sweep(items: Vec<Expr>, ctx: Context) -> Merged {
    let mut out: Vec<Expr> = Vec::with_capacity(items.len());
    let mut unsettled = false;
    for item in items {
        let Some(prev) = out.pop() else {
            out.push(item);
            continue;
        };
        match combine(&prev, &item, ctx) {
            Some(combined) => {
                unsettled |= !settles(&prev, &combined, ctx);
                out.push(combined);
            }
            None => {
                out.push(prev);
                out.push(item);
            }
        }
    }
    Merged {
        items: out,
        unsettled,
    }
}

/// Flatten, sort and sweep until no combination moves an element out of place.
///
/// A failure produced along the way is returned as the error value.
pub(crate) fn settle(mut items: Vec<Expr>, ctx: Context) -> Result<Vec<Expr>, Expr> {
    loop {
        items = flatten(items, ctx);
        sort_slice(&mut items, ctx);
        let merged = sweep(items, ctx);
        items = merged.items;
        if let Some(failure) = failure_among(&items) {
            return Err(failure);
        }
        if !merged.unsettled {
            return Ok(items);
        }
        trace!(len = items.len(), ?ctx, "merge unsettled, sweeping again");
    }
}

/// Sort, merge and assemble already-reduced operands of a Sum or Product.
///
/// Nested nodes of the same kind are absorbed one by one through the sequence
/// merge.
pub(crate) fn normalize(items: Vec<Expr>, ctx: Context) -> Expr {
    let kind = kind_of(ctx);
    let (nested, flat): (Vec<Expr>, Vec<Expr>) = items.into_iter().partition(|e| e.is(kind));
    let mut acc = match settle(flat, ctx) {
        Ok(items) => build(items, ctx),
        Err(failure) => return failure,
    };
    for inner in nested {
        acc = merge_nodes(&acc, &inner, ctx);
        if acc.is_failure() {
            return acc;
        }
    }
    acc
}

fn flatten(items: Vec<Expr>, ctx: Context) -> Vec<Expr> {
    let kind = kind_of(ctx);
    if !items.iter().any(|e| e.is(kind)) {
        return items;
    }
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if item.is(kind) {
            out.extend(item.into_operands());
        } else {
            out.push(item);
        }
    }
    out
}

fn combine(a: &Expr, b: &Expr, ctx: Context) -> Option<Expr> {
    if a.is_constant() && b.is_constant() {
        return Some(match ctx {
            Context::Product => mul_constants(a, b),
            _ => add_constants(a, b),
        });
    }
    match ctx {
        Context::Sum if same_term(a, b) => Some(combine_terms(a, b)),
        Context::Product if same_base(a, b) => Some(combine_factors(a, b)),
        _ => None,
    }
}

fn combine_terms(a: &Expr, b: &Expr) -> Expr {
    let (ca, term) = split_coefficient(a);
    let (cb, _) = split_coefficient(b);
    let one = Expr::integer(1);
    let coeff = add_constants(ca.unwrap_or(&one), cb.unwrap_or(&one));
    if coeff.is_zero() {
        return coeff;
    }
    if coeff.is_one() {
        return match term {
            [single] => single.clone(),
            _ => Expr::product(term.to_vec()),
        };
    }
    let mut factors = Vec::with_capacity(term.len() + 1);
    factors.push(coeff);
    factors.extend_from_slice(term);
    Expr::product(factors)
}

fn combine_factors(a: &Expr, b: &Expr) -> Expr {
    let one = Expr::integer(1);
    let ea = exponent(a).unwrap_or(&one).clone();
    let eb = exponent(b).unwrap_or(&one).clone();
    let exp = reduce(Expr::sum(vec![ea, eb]));
    reduce(Expr::power(base(a).clone(), exp))
}

/// Whether `combined` can stay where `prev` stood.
fn settles(prev: &Expr, combined: &Expr, ctx: Context) -> bool {
    if is_identity(combined, ctx) || (prev.is_constant() && combined.is_constant()) {
        return true;
    }
    match ctx {
        Context::Product => same_base(prev, combined),
        _ => same_term(prev, combined),
    }
}

fn is_identity(expr: &Expr, ctx: Context) -> bool {
    match ctx {
        Context::Product => expr.is_one(),
        _ => expr.is_zero(),
    }
}

/// The failure state a sequence collapses to, `Fail` taking precedence.
pub(crate) fn failure_among(items: &[Expr]) -> Option<Expr> {
    let mut found = None;
    for item in items {
        match item.kind() {
            Kind::Fail => return Some(item.clone()),
            Kind::Undefined => found = Some(item.clone()),
            _ => {}
        }
    }
    found
}

/// Assemble a normalized node from merged operands.
fn build(mut items: Vec<Expr>, ctx: Context) -> Expr {
    if ctx == Context::Product && items.iter().any(Expr::is_zero) {
        return Expr::integer(0);
    }
    items.retain(|e| !is_identity(e, ctx));
    match items.len() {
        0 => Expr::integer(if ctx == Context::Product { 1 } else { 0 }),
        1 => items.swap_remove(0),
        _ => Expr::compound(kind_of(ctx), items),
    }
}
