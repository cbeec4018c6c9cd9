//! Symbolic integration.
//!
//! Linearity, the power rule on linear bases, and `exp`/`sin`/`cos`/
//! `sinh`/`cosh` of linear arguments. Anything else yields `None`.

use drill_ast::{Constant, Context, Expr, ExprId};
use num_rational::BigRational;
use num_traits::One;

use crate::build::{add2_raw, div2_raw, mul2_raw, neg_raw, pow2_raw, sub2_raw};

pub fn integrate(ctx: &mut Context, expr: ExprId, var: &str) -> Option<ExprId> {
    // Constant: integrate(c) = c*x
    if !ctx.contains_var(expr, var) {
        let var_expr = ctx.var(var);
        return Some(mul2_raw(ctx, expr, var_expr));
    }

    match ctx.get(expr).clone() {
        // Linearity
        Expr::Add(l, r) => {
            let int_l = integrate(ctx, l, var)?;
            let int_r = integrate(ctx, r, var)?;
            Some(add2_raw(ctx, int_l, int_r))
        }
        Expr::Sub(l, r) => {
            let int_l = integrate(ctx, l, var)?;
            let int_r = integrate(ctx, r, var)?;
            Some(sub2_raw(ctx, int_l, int_r))
        }
        Expr::Neg(e) => {
            let int_e = integrate(ctx, e, var)?;
            Some(neg_raw(ctx, int_e))
        }
        // Constant Multiple: integrate(c * f(x)) = c * integrate(f(x))
        Expr::Mul(l, r) => {
            if !ctx.contains_var(l, var) {
                let int_r = integrate(ctx, r, var)?;
                return Some(mul2_raw(ctx, l, int_r));
            }
            if !ctx.contains_var(r, var) {
                let int_l = integrate(ctx, l, var)?;
                return Some(mul2_raw(ctx, r, int_l));
            }
            None
        }
        Expr::Div(num, den) => {
            if !ctx.contains_var(den, var) {
                let int_num = integrate(ctx, num, var)?;
                return Some(div2_raw(ctx, int_num, den));
            }
            // c/(ax+b) = c*ln(ax+b)/a
            if !ctx.contains_var(num, var) {
                let (a, _) = get_linear_coeffs(ctx, den, var)?;
                let ln_den = ctx.call("log", vec![den]);
                let scaled = mul2_raw(ctx, num, ln_den);
                return Some(divide_unless_one(ctx, scaled, a));
            }
            None
        }
        Expr::Pow(base, exp) => integrate_pow(ctx, expr, base, exp, var),
        Expr::Function(name, args) => integrate_call(ctx, expr, &name, &args, var),
        Expr::Variable(_) => {
            // integrate(x) = x^2/2
            let two = ctx.num(2);
            let pow_expr = pow2_raw(ctx, expr, two);
            Some(div2_raw(ctx, pow_expr, two))
        }
        _ => None,
    }
}

fn integrate_pow(
    ctx: &mut Context,
    expr: ExprId,
    base: ExprId,
    exp: ExprId,
    var: &str,
) -> Option<ExprId> {
    // integrate((ax+b)^n) = (ax+b)^(n+1) / (a*(n+1))
    if !ctx.contains_var(exp, var) {
        let (a, _) = get_linear_coeffs(ctx, base, var)?;
        if let Expr::Number(n) = ctx.get(exp) {
            if *n == -BigRational::one() {
                // ln(u) / a
                let ln_u = ctx.call("log", vec![base]);
                return Some(divide_unless_one(ctx, ln_u, a));
            }
        }

        let one = ctx.num(1);
        let new_exp = add2_raw(ctx, exp, one);
        let new_denom = if ctx.is_one(a) {
            new_exp
        } else {
            mul2_raw(ctx, a, new_exp)
        };
        let pow_expr = pow2_raw(ctx, base, new_exp);
        return Some(div2_raw(ctx, pow_expr, new_denom));
    }

    // integrate(c^(ax+b)) = c^(ax+b) / (a * ln(c)); for c = E just / a
    if !ctx.contains_var(base, var) {
        let (a, _) = get_linear_coeffs(ctx, exp, var)?;
        if matches!(ctx.get(base), Expr::Constant(Constant::E)) {
            return Some(divide_unless_one(ctx, expr, a));
        }
        let ln_c = ctx.call("log", vec![base]);
        let denom = if ctx.is_one(a) {
            ln_c
        } else {
            mul2_raw(ctx, a, ln_c)
        };
        return Some(div2_raw(ctx, expr, denom));
    }

    None
}

fn integrate_call(
    ctx: &mut Context,
    expr: ExprId,
    name: &str,
    args: &[ExprId],
    var: &str,
) -> Option<ExprId> {
    let [arg] = args else {
        return None;
    };
    let arg = *arg;

    if name == "sqrt" {
        let half = ctx.rational(BigRational::new(1.into(), 2.into()));
        let power = pow2_raw(ctx, arg, half);
        return integrate(ctx, power, var);
    }

    let (a, _) = get_linear_coeffs(ctx, arg, var)?;
    let antiderivative = match name {
        // -cos(ax+b)/a
        "sin" => {
            let cos_arg = ctx.call("cos", vec![arg]);
            neg_raw(ctx, cos_arg)
        }
        // sin(ax+b)/a
        "cos" => ctx.call("sin", vec![arg]),
        "exp" => expr,
        "sinh" => ctx.call("cosh", vec![arg]),
        "cosh" => ctx.call("sinh", vec![arg]),
        _ => return None,
    };
    Some(divide_unless_one(ctx, antiderivative, a))
}

fn divide_unless_one(ctx: &mut Context, e: ExprId, a: ExprId) -> ExprId {
    if ctx.is_one(a) {
        e
    } else {
        div2_raw(ctx, e, a)
    }
}

/// Returns (a, b) such that expr = a*var + b, with a and b free of var.
pub(crate) fn get_linear_coeffs(
    ctx: &mut Context,
    expr: ExprId,
    var: &str,
) -> Option<(ExprId, ExprId)> {
    if !ctx.contains_var(expr, var) {
        return Some((ctx.num(0), expr));
    }

    match ctx.get(expr).clone() {
        Expr::Variable(v) if v == var => Some((ctx.num(1), ctx.num(0))),
        Expr::Mul(l, r) => {
            // c * x
            if !ctx.contains_var(l, var) && is_var(ctx, r, var) {
                return Some((l, ctx.num(0)));
            }
            // x * c
            if is_var(ctx, l, var) && !ctx.contains_var(r, var) {
                return Some((r, ctx.num(0)));
            }
            None
        }
        // x / c
        Expr::Div(l, r) if is_var(ctx, l, var) && !ctx.contains_var(r, var) => {
            let one = ctx.num(1);
            Some((div2_raw(ctx, one, r), ctx.num(0)))
        }
        Expr::Neg(e) => {
            let (a, b) = get_linear_coeffs(ctx, e, var)?;
            Some((neg_raw(ctx, a), neg_raw(ctx, b)))
        }
        Expr::Add(l, r) => {
            let (a1, b1) = get_linear_coeffs(ctx, l, var)?;
            let (a2, b2) = get_linear_coeffs(ctx, r, var)?;
            Some((add2_raw(ctx, a1, a2), add2_raw(ctx, b1, b2)))
        }
        Expr::Sub(l, r) => {
            let (a1, b1) = get_linear_coeffs(ctx, l, var)?;
            let (a2, b2) = get_linear_coeffs(ctx, r, var)?;
            Some((sub2_raw(ctx, a1, a2), sub2_raw(ctx, b1, b2)))
        }
        _ => None,
    }
}

fn is_var(ctx: &Context, expr: ExprId, var: &str) -> bool {
    matches!(ctx.get(expr), Expr::Variable(v) if v == var)
}
