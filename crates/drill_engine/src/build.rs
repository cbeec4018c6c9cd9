//! Build helpers for expression construction.
//!
//! All helpers preserve operand order exactly; nothing here simplifies.

use drill_ast::{Context, Expr, ExprId};

#[inline]
pub fn mul2_raw(ctx: &mut Context, a: ExprId, b: ExprId) -> ExprId {
    ctx.add(Expr::Mul(a, b))
}

#[inline]
pub fn add2_raw(ctx: &mut Context, a: ExprId, b: ExprId) -> ExprId {
    ctx.add(Expr::Add(a, b))
}

#[inline]
pub fn sub2_raw(ctx: &mut Context, a: ExprId, b: ExprId) -> ExprId {
    ctx.add(Expr::Sub(a, b))
}

#[inline]
pub fn div2_raw(ctx: &mut Context, a: ExprId, b: ExprId) -> ExprId {
    ctx.add(Expr::Div(a, b))
}

#[inline]
pub fn pow2_raw(ctx: &mut Context, base: ExprId, exp: ExprId) -> ExprId {
    ctx.add(Expr::Pow(base, exp))
}

#[inline]
pub fn neg_raw(ctx: &mut Context, a: ExprId) -> ExprId {
    ctx.add(Expr::Neg(a))
}

/// Left-folds factors: `[a, b, c]` → `(a * b) * c`.
///
/// Returns `None` if factors is empty.
pub fn mul_many_raw(ctx: &mut Context, factors: &[ExprId]) -> Option<ExprId> {
    let (first, rest) = factors.split_first()?;
    Some(rest.iter().fold(*first, |acc, &f| mul2_raw(ctx, acc, f)))
}

/// Left-folds terms: `[a, b, c]` → `(a + b) + c`.
///
/// Returns `None` if terms is empty.
pub fn add_many_raw(ctx: &mut Context, terms: &[ExprId]) -> Option<ExprId> {
    let (first, rest) = terms.split_first()?;
    Some(rest.iter().fold(*first, |acc, &t| add2_raw(ctx, acc, t)))
}
