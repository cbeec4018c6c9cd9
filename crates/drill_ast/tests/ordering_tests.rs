//! The structural order is total and independent of arena insertion order.

use std::cmp::Ordering;

use drill_ast::ordering::compare_expr;
use drill_ast::{Context, Expr, ExprId};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Tree {
    Num(i64),
    Var(&'static str),
    Add(Box<Tree>, Box<Tree>),
    Mul(Box<Tree>, Box<Tree>),
    Pow(Box<Tree>, Box<Tree>),
    Neg(Box<Tree>),
    Call(&'static str, Box<Tree>),
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        (-5i64..5).prop_map(Tree::Num),
        prop::sample::select(vec!["a", "b", "x"]).prop_map(Tree::Var),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Tree::Add(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Tree::Mul(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Tree::Pow(Box::new(l), Box::new(r))),
            inner.clone().prop_map(|e| Tree::Neg(Box::new(e))),
            (prop::sample::select(vec!["sin", "log"]), inner)
                .prop_map(|(f, e)| Tree::Call(f, Box::new(e))),
        ]
    })
}

fn build(ctx: &mut Context, tree: &Tree) -> ExprId {
    match tree {
        Tree::Num(n) => ctx.num(*n),
        Tree::Var(v) => ctx.var(v),
        Tree::Add(l, r) => {
            let (l, r) = (build(ctx, l), build(ctx, r));
            ctx.add(Expr::Add(l, r))
        }
        Tree::Mul(l, r) => {
            let (l, r) = (build(ctx, l), build(ctx, r));
            ctx.add(Expr::Mul(l, r))
        }
        Tree::Pow(l, r) => {
            let (l, r) = (build(ctx, l), build(ctx, r));
            ctx.add(Expr::Pow(l, r))
        }
        Tree::Neg(e) => {
            let e = build(ctx, e);
            ctx.add(Expr::Neg(e))
        }
        Tree::Call(f, e) => {
            let e = build(ctx, e);
            ctx.call(f, vec![e])
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_equal_only_for_same_node(a in arb_tree(), b in arb_tree()) {
        let mut ctx = Context::new();
        let (ia, ib) = (build(&mut ctx, &a), build(&mut ctx, &b));
        let ord = compare_expr(&ctx, ia, ib);
        prop_assert_eq!(ord == Ordering::Equal, ia == ib);
        prop_assert_eq!(compare_expr(&ctx, ib, ia), ord.reverse());
    }

    #[test]
    fn test_order_ignores_insertion_order(a in arb_tree(), b in arb_tree()) {
        let mut first = Context::new();
        let (a1, b1) = (build(&mut first, &a), build(&mut first, &b));

        let mut second = Context::new();
        for name in ["x", "b", "a"] {
            second.var(name);
        }
        let b2 = build(&mut second, &b);
        let a2 = build(&mut second, &a);

        prop_assert_eq!(compare_expr(&first, a1, b1), compare_expr(&second, a2, b2));
    }
}

#[test]
fn test_numbers_before_symbols_before_sums() {
    let mut ctx = Context::new();
    let x = ctx.var("x");
    let two = ctx.num(2);
    let sum = ctx.add(Expr::Add(x, two));
    assert_eq!(compare_expr(&ctx, two, x), Ordering::Less);
    assert_eq!(compare_expr(&ctx, x, sum), Ordering::Less);
}
