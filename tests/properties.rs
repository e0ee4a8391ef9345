use std::cmp::Ordering;

use proptest::prelude::*;
use symcore::expr::{add, mul};
use symcore::simplify::is_sorted;
use symcore::{Context, Kind, compare, expand, reduce, sort};

mod strategies;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reduce_is_idempotent(e in strategies::arb_expr()) {
        let once = reduce(e);
        let twice = reduce(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn expansion_ends_in_normal_form(e in strategies::arb_expr()) {
        let expanded = expand(e);
        prop_assert_eq!(reduce(expanded.clone()), expanded);
    }

    #[test]
    fn sums_and_products_commute(a in strategies::arb_expr(), b in strategies::arb_expr()) {
        let ab = reduce(add(vec![a.clone(), b.clone()]));
        let ba = reduce(add(vec![b.clone(), a.clone()]));
        prop_assert_eq!(ab, ba);
        let ab = reduce(mul(vec![a.clone(), b.clone()]));
        let ba = reduce(mul(vec![b, a]));
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn order_is_antisymmetric(
        a in strategies::arb_expr(),
        b in strategies::arb_expr(),
        ctx in strategies::arb_context(),
    ) {
        let (a, b) = (reduce(a), reduce(b));
        prop_assert_eq!(compare(&a, &b, ctx), compare(&b, &a, ctx).reverse());
    }

    #[test]
    fn order_is_transitive(
        a in strategies::arb_expr(),
        b in strategies::arb_expr(),
        c in strategies::arb_expr(),
        ctx in strategies::arb_context(),
    ) {
        let mut items = [reduce(a), reduce(b), reduce(c)];
        items.sort_by(|x, y| compare(x, y, ctx));
        prop_assert_ne!(compare(&items[0], &items[1], ctx), Ordering::Greater);
        prop_assert_ne!(compare(&items[1], &items[2], ctx), Ordering::Greater);
        prop_assert_ne!(compare(&items[0], &items[2], ctx), Ordering::Greater);
    }

    #[test]
    fn reduced_nodes_are_sorted(e in strategies::arb_expr()) {
        let r = reduce(e);
        if r.is(Kind::Sum) || r.is(Kind::Product) {
            prop_assert!(is_sorted(r.operands(), Context::of(r.kind())));
        }
        let again = sort(r.clone());
        prop_assert!(again.ptr_eq(&r));
    }
}
