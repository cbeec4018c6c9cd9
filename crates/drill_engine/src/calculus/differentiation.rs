//! Symbolic differentiation.
//!
//! Standard rules: constant, sum, product, quotient, power, chain. Results
//! are raw trees; the simplifier is responsible for tidying them.

use drill_ast::{Constant, Context, Expr, ExprId};

use crate::build::{add2_raw, div2_raw, mul2_raw, neg_raw, pow2_raw, sub2_raw};

/// `d(expr)/d(var)`, or `None` when some subterm has no known derivative
/// (undefined functions, factorials, ...).
pub fn differentiate(ctx: &mut Context, expr: ExprId, var: &str) -> Option<ExprId> {
    // 1. Constant Rule: diff(c, x) = 0
    if !ctx.contains_var(expr, var) {
        return Some(ctx.num(0));
    }

    match ctx.get(expr).clone() {
        Expr::Variable(_) => Some(ctx.num(1)),
        Expr::Add(l, r) => {
            let dl = differentiate(ctx, l, var)?;
            let dr = differentiate(ctx, r, var)?;
            Some(add2_raw(ctx, dl, dr))
        }
        Expr::Sub(l, r) => {
            let dl = differentiate(ctx, l, var)?;
            let dr = differentiate(ctx, r, var)?;
            Some(sub2_raw(ctx, dl, dr))
        }
        Expr::Neg(e) => {
            let de = differentiate(ctx, e, var)?;
            Some(neg_raw(ctx, de))
        }
        Expr::Mul(l, r) => {
            // Product Rule: (uv)' = u'v + uv'
            let dl = differentiate(ctx, l, var)?;
            let dr = differentiate(ctx, r, var)?;
            let term1 = mul2_raw(ctx, dl, r);
            let term2 = mul2_raw(ctx, l, dr);
            Some(add2_raw(ctx, term1, term2))
        }
        Expr::Div(l, r) => {
            // Quotient Rule: (u/v)' = (u'v - uv') / v^2
            let dl = differentiate(ctx, l, var)?;
            let dr = differentiate(ctx, r, var)?;
            let term1 = mul2_raw(ctx, dl, r);
            let term2 = mul2_raw(ctx, l, dr);
            let num = sub2_raw(ctx, term1, term2);
            let two = ctx.num(2);
            let den = pow2_raw(ctx, r, two);
            Some(div2_raw(ctx, num, den))
        }
        Expr::Pow(base, exp) => differentiate_pow(ctx, expr, base, exp, var),
        Expr::Function(name, args) => differentiate_call(ctx, expr, &name, &args, var),
        Expr::Integral {
            integrand,
            var: bound,
            bounds: None,
        } if bound == var => {
            // Fundamental theorem: d/dx Integral(f, x) = f
            Some(integrand)
        }
        _ => None,
    }
}

fn differentiate_pow(
    ctx: &mut Context,
    expr: ExprId,
    base: ExprId,
    exp: ExprId,
    var: &str,
) -> Option<ExprId> {
    let db = differentiate(ctx, base, var)?;

    if !ctx.contains_var(exp, var) {
        // n * u^(n-1) * u'
        let one = ctx.num(1);
        let n_minus_one = sub2_raw(ctx, exp, one);
        let pow_term = pow2_raw(ctx, base, n_minus_one);
        let term = mul2_raw(ctx, exp, pow_term);
        return Some(mul2_raw(ctx, term, db));
    }

    let de = differentiate(ctx, exp, var)?;
    if !ctx.contains_var(base, var) {
        // a^u * ln(a) * u'
        if matches!(ctx.get(base), Expr::Constant(Constant::E)) {
            return Some(mul2_raw(ctx, expr, de));
        }
        let ln_a = ctx.call("log", vec![base]);
        let term = mul2_raw(ctx, expr, ln_a);
        return Some(mul2_raw(ctx, term, de));
    }

    // Full rule: u^v * (v'*ln(u) + v*u'/u)
    let ln_base = ctx.call("log", vec![base]);
    let term1 = mul2_raw(ctx, de, ln_base);
    let term2_num = mul2_raw(ctx, exp, db);
    let term2 = div2_raw(ctx, term2_num, base);
    let inner = add2_raw(ctx, term1, term2);
    Some(mul2_raw(ctx, expr, inner))
}

fn differentiate_call(
    ctx: &mut Context,
    expr: ExprId,
    name: &str,
    args: &[ExprId],
    var: &str,
) -> Option<ExprId> {
    if name == "log" && args.len() == 2 {
        // log(u, b) = log(u)/log(b)
        let num = ctx.call("log", vec![args[0]]);
        let den = ctx.call("log", vec![args[1]]);
        let quotient = div2_raw(ctx, num, den);
        return differentiate(ctx, quotient, var);
    }
    if name == "root" && args.len() == 2 {
        let one = ctx.num(1);
        let exponent = div2_raw(ctx, one, args[1]);
        let power = pow2_raw(ctx, args[0], exponent);
        return differentiate(ctx, power, var);
    }

    let [arg] = args else {
        return None;
    };
    let arg = *arg;
    let da = differentiate(ctx, arg, var)?;

    let outer = match name {
        // cos(u)
        "sin" => ctx.call("cos", vec![arg]),
        // -sin(u)
        "cos" => {
            let sin_u = ctx.call("sin", vec![arg]);
            neg_raw(ctx, sin_u)
        }
        // 1/cos(u)^2
        "tan" => {
            let cos_u = ctx.call("cos", vec![arg]);
            reciprocal_square(ctx, cos_u)
        }
        // -1/sin(u)^2
        "cot" => {
            let sin_u = ctx.call("sin", vec![arg]);
            let r = reciprocal_square(ctx, sin_u);
            neg_raw(ctx, r)
        }
        // sec(u)*tan(u)
        "sec" => {
            let tan_u = ctx.call("tan", vec![arg]);
            mul2_raw(ctx, expr, tan_u)
        }
        // -csc(u)*cot(u)
        "csc" => {
            let cot_u = ctx.call("cot", vec![arg]);
            let prod = mul2_raw(ctx, expr, cot_u);
            neg_raw(ctx, prod)
        }
        // 1/sqrt(1 - u^2)
        "asin" => one_over_sqrt_one_minus_square(ctx, arg),
        // -1/sqrt(1 - u^2)
        "acos" => {
            let r = one_over_sqrt_one_minus_square(ctx, arg);
            neg_raw(ctx, r)
        }
        // 1/(1 + u^2)
        "atan" => {
            let one = ctx.num(1);
            let two = ctx.num(2);
            let sq = pow2_raw(ctx, arg, two);
            let den = add2_raw(ctx, one, sq);
            div2_raw(ctx, one, den)
        }
        "sinh" => ctx.call("cosh", vec![arg]),
        "cosh" => ctx.call("sinh", vec![arg]),
        // 1/cosh(u)^2
        "tanh" => {
            let cosh_u = ctx.call("cosh", vec![arg]);
            reciprocal_square(ctx, cosh_u)
        }
        "exp" => expr,
        // 1/u
        "log" => {
            let one = ctx.num(1);
            div2_raw(ctx, one, arg)
        }
        // 1/(2*sqrt(u))
        "sqrt" => {
            let one = ctx.num(1);
            let two = ctx.num(2);
            let den = mul2_raw(ctx, two, expr);
            div2_raw(ctx, one, den)
        }
        // u/Abs(u)
        "Abs" => div2_raw(ctx, arg, expr),
        _ => return None,
    };
    Some(mul2_raw(ctx, outer, da))
}

fn reciprocal_square(ctx: &mut Context, e: ExprId) -> ExprId {
    let one = ctx.num(1);
    let two = ctx.num(2);
    let sq = pow2_raw(ctx, e, two);
    div2_raw(ctx, one, sq)
}

fn one_over_sqrt_one_minus_square(ctx: &mut Context, u: ExprId) -> ExprId {
    let one = ctx.num(1);
    let two = ctx.num(2);
    let sq = pow2_raw(ctx, u, two);
    let diff = sub2_raw(ctx, one, sq);
    let root = ctx.call("sqrt", vec![diff]);
    div2_raw(ctx, one, root)
}
