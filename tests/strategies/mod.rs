use proptest::prelude::*;
use symcore::Context;
use symcore::expr::{Expr, add, div, frac, int, mul, pow, sub, sym};

pub fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        // Small integers and fractions keep coefficients readable in failures
        (-6i64..7).prop_map(int),
        (-4i64..5, 1i64..5).prop_map(|(n, d)| frac(n, d)),
        prop::sample::select(vec!["a", "b", "c"]).prop_map(|name| sym(name)),
    ];

    leaf.prop_recursive(
        3,  // levels deep
        24, // max size
        3,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..4).prop_map(add),
                prop::collection::vec(inner.clone(), 1..4).prop_map(mul),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| sub(vec![l, r])),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| div(l, r)),
                (inner.clone(), -1i64..4).prop_map(|(b, n)| pow(b, int(n))),
                // Fractional exponents stay symbolic and keep the merge rounds busy
                (inner.clone(), 1i64..3, 2i64..4).prop_map(|(b, n, d)| pow(b, frac(n, d))),
                inner.clone().prop_map(Expr::sqrt),
                inner.clone().prop_map(|e| Expr::call("f", vec![e])),
            ]
        },
    )
}

pub fn arb_context() -> impl Strategy<Value = Context> {
    prop_oneof![
        Just(Context::Sum),
        Just(Context::Product),
        Just(Context::Neutral),
    ]
}
