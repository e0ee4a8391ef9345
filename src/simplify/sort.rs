//! Canonical sorting of commutative operands.

use std::cmp::Ordering;

use crate::expr::Expr;
use crate::simplify::order::{Context, compare};

/// Sort the operands of every Sum and Product in `expr`, bottom-up.
///
/// Ordered kinds keep their operand order but are still descended into.
pub fn sort(mut expr: Expr) -> Expr {
    if expr.is_terminal() {
        return expr;
    }
    for idx in 0..expr.size() {
        let child = expr.operand(idx).clone();
        if child.is_terminal() {
            continue;
        }
        let sorted = sort(child);
        if !sorted.ptr_eq(expr.operand(idx)) {
            expr.set_operand(idx, sorted);
        }
    }
    if !expr.kind().is_ordered() {
        let ctx = Context::of(expr.kind());
        if !is_sorted(expr.operands(), ctx) {
            sort_slice(expr.operands_mut().as_mut_slice(), ctx);
        }
    }
    expr
}

pub fn is_sorted(items: &[Expr], ctx: Context) -> bool {
    items
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1], ctx) != Ordering::Greater)
}

/// Partition-exchange sort with the last element as pivot.
///
/// Recurses into the smaller side and loops over the larger one, so the stack
/// depth stays logarithmic in the number of operands.
pub(crate) fn sort_slice(mut items: &mut [Expr], ctx: Context) {
    while items.len() > 1 {
        let pivot = partition(items, ctx);
        let (left, rest) = std::mem::take(&mut items).split_at_mut(pivot);
        let right = &mut rest[1..];
        if left.len() < right.len() {
            sort_slice(left, ctx);
            items = right;
        } else {
            sort_slice(right, ctx);
            items = left;
        }
    }
}

fn partition(items: &mut [Expr], ctx: Context) -> usize {
    let last = items.len() - 1;
    let mut store = 0;
    for idx in 0..last {
        if compare(&items[idx], &items[last], ctx) == Ordering::Less {
            items.swap(idx, store);
            store += 1;
        }
    }
    items.swap(store, last);
    store
}
