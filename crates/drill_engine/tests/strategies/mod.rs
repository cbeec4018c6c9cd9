use proptest::prelude::*;

/// Answer-like expression text over `x`, `y`, `z`.
///
/// Denominators are `(v + k)` with `k > 0` and exponents are positive, so
/// no generated expression is undefined.
pub fn arb_expr_text() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (-6i64..=6).prop_map(|n| if n < 0 { format!("({})", n) } else { n.to_string() }),
        prop::sample::select(vec!["x", "y", "z"]).prop_map(str::to_string),
        Just("pi".to_string()),
    ];

    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({} + {})", l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({} - {})", l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("{}*{}", l, r)),
            (inner.clone(), prop::sample::select(vec!["x", "y"]), 1i64..4)
                .prop_map(|(n, v, k)| format!("{}/({} + {})", n, v, k)),
            (inner.clone(), 1u32..=3).prop_map(|(b, k)| format!("({})**{}", b, k)),
            inner.clone().prop_map(|e| format!("-({})", e)),
            inner.clone().prop_map(|e| format!("sin({})", e)),
            inner.clone().prop_map(|e| format!("cos({})", e)),
            inner.prop_map(|e| format!("exp({})", e)),
        ]
    })
}
