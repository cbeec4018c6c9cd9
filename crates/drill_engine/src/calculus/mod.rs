//! Deferred calculus operators.
//!
//! - `differentiation`: symbolic derivative computation
//! - `integration`: symbolic antiderivatives for elementary integrands
//!
//! [`doit`] evaluates every `Derivative`/`Integral` node it can, innermost
//! first. Nodes without a symbolic result stay deferred.

mod differentiation;
mod integration;

pub use differentiation::differentiate;
pub use integration::integrate;

use drill_ast::{Constant, Context, Expr, ExprId};

use crate::assumptions::AssumptionSet;
use crate::build::sub2_raw;
use crate::options::EngineLimits;
use crate::simplify::simplify_once;

/// Evaluate deferred operators throughout `expr`.
pub fn doit(ctx: &mut Context, expr: ExprId, assumptions: &AssumptionSet) -> ExprId {
    match ctx.get(expr).clone() {
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => expr,
        Expr::Add(l, r) => rebuild2(ctx, l, r, assumptions, Expr::Add),
        Expr::Sub(l, r) => rebuild2(ctx, l, r, assumptions, Expr::Sub),
        Expr::Mul(l, r) => rebuild2(ctx, l, r, assumptions, Expr::Mul),
        Expr::Div(l, r) => rebuild2(ctx, l, r, assumptions, Expr::Div),
        Expr::Pow(l, r) => rebuild2(ctx, l, r, assumptions, Expr::Pow),
        Expr::Neg(e) => {
            let e = doit(ctx, e, assumptions);
            ctx.add(Expr::Neg(e))
        }
        Expr::Function(name, args) => {
            let args = args.into_iter().map(|a| doit(ctx, a, assumptions)).collect();
            ctx.add(Expr::Function(name, args))
        }
        Expr::Derivative { expr: inner, wrt } => {
            let inner = doit(ctx, inner, assumptions);
            let mut current = inner;
            for (var, order) in &wrt {
                for _ in 0..*order {
                    match differentiate(ctx, current, var) {
                        Some(d) => current = d,
                        None => {
                            tracing::debug!(target: "simplify", var = %var, "derivative_deferred");
                            return ctx.add(Expr::Derivative {
                                expr: inner,
                                wrt: wrt.clone(),
                            });
                        }
                    }
                }
            }
            current
        }
        Expr::Integral {
            integrand,
            var,
            bounds,
        } => {
            let integrand = doit(ctx, integrand, assumptions);
            let bounds = bounds.map(|(lo, hi)| (doit(ctx, lo, assumptions), doit(ctx, hi, assumptions)));
            let deferred = |ctx: &mut Context| {
                ctx.add(Expr::Integral {
                    integrand,
                    var: var.clone(),
                    bounds,
                })
            };

            let Some(antiderivative) = antiderivative(ctx, integrand, &var, assumptions) else {
                tracing::debug!(target: "simplify", var = %var, "integral_deferred");
                return deferred(ctx);
            };

            match bounds {
                None => antiderivative,
                Some((lo, hi)) => {
                    if is_unbounded(ctx, lo) || is_unbounded(ctx, hi) {
                        return deferred(ctx);
                    }
                    let upper = substitute(ctx, antiderivative, &var, hi);
                    let lower = substitute(ctx, antiderivative, &var, lo);
                    sub2_raw(ctx, upper, lower)
                }
            }
        }
    }
}

fn rebuild2(
    ctx: &mut Context,
    l: ExprId,
    r: ExprId,
    assumptions: &AssumptionSet,
    make: fn(ExprId, ExprId) -> Expr,
) -> ExprId {
    let l = doit(ctx, l, assumptions);
    let r = doit(ctx, r, assumptions);
    ctx.add(make(l, r))
}

/// Antiderivative of `integrand`, retrying on the expanded form when the
/// integrand as written matches no rule (`x*(x+1)`, `(x+1)**2/x`).
fn antiderivative(
    ctx: &mut Context,
    integrand: ExprId,
    var: &str,
    assumptions: &AssumptionSet,
) -> Option<ExprId> {
    if let Some(f) = integrate(ctx, integrand, var) {
        return Some(f);
    }
    let expanded = simplify_once(ctx, integrand, assumptions, &EngineLimits::default()).ok()?;
    if expanded == integrand {
        return None;
    }
    integrate(ctx, expanded, var)
}

fn is_unbounded(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Constant(Constant::Infinity | Constant::Undefined) => true,
        Expr::Neg(inner) => is_unbounded(ctx, *inner),
        _ => false,
    }
}

/// Replace every free occurrence of `var` in `expr` with `value`.
pub fn substitute(ctx: &mut Context, expr: ExprId, var: &str, value: ExprId) -> ExprId {
    if !ctx.contains_var(expr, var) {
        return expr;
    }
    match ctx.get(expr).clone() {
        Expr::Variable(_) => value,
        Expr::Number(_) | Expr::Constant(_) => expr,
        Expr::Add(l, r) => subst2(ctx, l, r, var, value, Expr::Add),
        Expr::Sub(l, r) => subst2(ctx, l, r, var, value, Expr::Sub),
        Expr::Mul(l, r) => subst2(ctx, l, r, var, value, Expr::Mul),
        Expr::Div(l, r) => subst2(ctx, l, r, var, value, Expr::Div),
        Expr::Pow(l, r) => subst2(ctx, l, r, var, value, Expr::Pow),
        Expr::Neg(e) => {
            let e = substitute(ctx, e, var, value);
            ctx.add(Expr::Neg(e))
        }
        Expr::Function(name, args) => {
            let args = args
                .into_iter()
                .map(|a| substitute(ctx, a, var, value))
                .collect();
            ctx.add(Expr::Function(name, args))
        }
        Expr::Derivative { expr: inner, wrt } => {
            let inner = substitute(ctx, inner, var, value);
            ctx.add(Expr::Derivative { expr: inner, wrt })
        }
        Expr::Integral {
            integrand,
            var: bound,
            bounds,
        } => {
            let bounds = bounds.map(|(lo, hi)| {
                (
                    substitute(ctx, lo, var, value),
                    substitute(ctx, hi, var, value),
                )
            });
            // A definite integral binds its own variable.
            let integrand = if bounds.is_some() && bound == var {
                integrand
            } else {
                substitute(ctx, integrand, var, value)
            };
            ctx.add(Expr::Integral {
                integrand,
                var: bound,
                bounds,
            })
        }
    }
}

fn subst2(
    ctx: &mut Context,
    l: ExprId,
    r: ExprId,
    var: &str,
    value: ExprId,
    make: fn(ExprId, ExprId) -> Expr,
) -> ExprId {
    let l = substitute(ctx, l, var, value);
    let r = substitute(ctx, r, var, value);
    ctx.add(make(l, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equivalence::Equivalence;
    use drill_ast::DisplayExpr;
    use drill_parser::parse;

    fn evaluates_to(input: &str, expected: &str) {
        let mut ctx = Context::new();
        let set = AssumptionSet::new();
        let e = parse(input, &mut ctx).unwrap();
        let done = doit(&mut ctx, e, &set);
        let want = parse(expected, &mut ctx).unwrap();
        let eq = Equivalence::new(&set, EngineLimits::default());
        assert!(
            eq.equal(&mut ctx, done, want).unwrap(),
            "{} gave {}, expected {}",
            input,
            DisplayExpr::new(&ctx, done),
            expected
        );
    }

    #[test]
    fn test_derivative_of_polynomial() {
        evaluates_to("Derivative(x**2 + 3*x, x)", "2*x + 3");
    }

    #[test]
    fn test_higher_order_derivative() {
        evaluates_to("Derivative(x**4, (x, 3))", "24*x");
        evaluates_to("Derivative(x**2*y**3, x, y)", "6*x*y**2");
    }

    #[test]
    fn test_chain_rule() {
        evaluates_to("Derivative(sin(x**2), x)", "2*x*cos(x**2)");
        evaluates_to("Derivative(exp(3*x), x)", "3*exp(3*x)");
        evaluates_to("Derivative(log(x), x)", "1/x");
        evaluates_to("Derivative(tan(x), x)", "1 + tan(x)**2");
    }

    #[test]
    fn test_indefinite_integrals() {
        evaluates_to("Integral(x**2, x)", "x**3/3");
        evaluates_to("Integral(cos(2*x), x)", "sin(2*x)/2");
        evaluates_to("Integral(1/x, x)", "log(x)");
        evaluates_to("Integral(exp(x), x)", "exp(x)");
    }

    #[test]
    fn test_integral_retries_expanded_form() {
        evaluates_to("Integral(x*(x + 1), x)", "x**3/3 + x**2/2");
    }

    #[test]
    fn test_definite_integral() {
        evaluates_to("Integral(x, (x, 0, 2))", "2");
        evaluates_to("Integral(sin(t), (t, 0, pi))", "2");
    }

    #[test]
    fn test_unknown_operators_stay_deferred() {
        let mut ctx = Context::new();
        let set = AssumptionSet::new();
        let e = parse("Integral(exp(x**2), x)", &mut ctx).unwrap();
        let done = doit(&mut ctx, e, &set);
        assert!(ctx.get(done).is_deferred_operator());

        let d = parse("Derivative(f(x), x)", &mut ctx).unwrap();
        assert_eq!(doit(&mut ctx, d, &set), d);

        let oo = parse("Integral(exp(-x), (x, 0, oo))", &mut ctx).unwrap();
        let done = doit(&mut ctx, oo, &set);
        assert!(ctx.get(done).is_deferred_operator());
    }

    #[test]
    fn test_substitute_respects_bound_variable() {
        let mut ctx = Context::new();
        let e = parse("x + Integral(x, (x, 0, 1))", &mut ctx).unwrap();
        let two = ctx.num(2);
        let out = substitute(&mut ctx, e, "x", two);
        assert_eq!(
            DisplayExpr::new(&ctx, out).to_string(),
            "2 + Integral(x, (x, 0, 1))"
        );
    }
}
