//! Canonical simplification.
//!
//! A pass converts an expression into a [`Fraction`] of polynomials over
//! canonical atoms, settles the relations between atoms the polynomial
//! arithmetic cannot see (`sin**2 = 1 - cos**2`, `2**(3/2) = 2*2**(1/2)`),
//! and rebuilds an expression from the result.
//!
//! Atoms are arena ids of canonical subterms:
//!
//! - symbols, `pi`, and `E` (whose exponent carries `exp` of constants)
//! - function applications with canonical arguments (`sin(x)`, `log(x + 1)`)
//! - `exp(m)` for a unit monomial `m`, raised to the monomial's coefficient
//! - integers under fractional exponents (`2**(1/2)`)
//! - composite bases under fractional exponents (`(x + 1)**(1/2)`)
//! - symbolic powers `b**m` for a unit monomial `m`
//! - deferred `Derivative`/`Integral` nodes
//!
//! Every pass is bounded by a [`Budget`] built from [`EngineLimits`].

mod functions;
mod numeric;
mod output;
mod power;
mod settle;
mod trig;

use drill_ast::{Constant, Context, Expr, ExprId};
use num_rational::BigRational;
use num_traits::One;
use rustc_hash::FxHashMap;

use crate::assumptions::AssumptionSet;
use crate::budget::{Budget, BudgetExceeded, Metric, Operation};
use crate::error::EngineError;
use crate::options::EngineLimits;
use crate::poly::{Fraction, Monomial, Poly};
use crate::sign::{Sign, SignOracle};

/// One simplification pass over `expr`.
pub fn simplify_once(
    ctx: &mut Context,
    expr: ExprId,
    assumptions: &AssumptionSet,
    limits: &EngineLimits,
) -> Result<ExprId, EngineError> {
    let mut simplifier = Simplifier::new(ctx, assumptions, limits);
    simplifier.simplify(expr)
}

/// Repeat [`simplify_once`] until the result stops changing.
///
/// Fails with [`EngineError::FixedPointNotReached`] after
/// `limits.max_fixed_point_passes` passes.
pub fn simplify_to_fixed_point(
    ctx: &mut Context,
    expr: ExprId,
    assumptions: &AssumptionSet,
    limits: &EngineLimits,
) -> Result<ExprId, EngineError> {
    tracing::debug!(target: "simplify", nodes = ctx.len(), "phase_start");
    let mut current = expr;
    for pass in 1..=limits.max_fixed_point_passes {
        let next = simplify_once(ctx, current, assumptions, limits)?;
        if next == current {
            tracing::debug!(target: "simplify", passes = pass, nodes = ctx.len(), "phase_fixed_point");
            return Ok(next);
        }
        current = next;
    }
    tracing::warn!(
        target: "simplify",
        passes = limits.max_fixed_point_passes,
        "fixed_point_cap_reached"
    );
    Err(EngineError::FixedPointNotReached {
        passes: limits.max_fixed_point_passes,
    })
}

/// How the settle step treats an atom.
pub(crate) enum AtomKind {
    /// An integer under a fractional exponent.
    Numeric(BigRational),
    /// A sum, product or numeric power under a fractional exponent.
    Composite,
    Sin(ExprId),
    Abs(ExprId),
    Other,
}

pub(crate) struct Simplifier<'a> {
    ctx: &'a mut Context,
    assumptions: &'a AssumptionSet,
    limits: &'a EngineLimits,
    budget: Budget,
    nodes_at_start: usize,
    memo: FxHashMap<ExprId, Fraction>,
    pi: ExprId,
    euler: ExprId,
}

impl<'a> Simplifier<'a> {
    pub(crate) fn new(
        ctx: &'a mut Context,
        assumptions: &'a AssumptionSet,
        limits: &'a EngineLimits,
    ) -> Self {
        let pi = ctx.constant(Constant::Pi);
        let euler = ctx.constant(Constant::E);
        let nodes_at_start = ctx.len();
        Self {
            ctx,
            assumptions,
            limits,
            budget: Budget::for_pass(limits),
            nodes_at_start,
            memo: FxHashMap::default(),
            pi,
            euler,
        }
    }

    /// Canonical form of `expr`. A bare `oo` or `nan` is returned as is;
    /// inside arithmetic either one makes the result undefined.
    pub(crate) fn simplify(&mut self, expr: ExprId) -> Result<ExprId, EngineError> {
        if matches!(
            self.ctx.get(expr),
            Expr::Constant(Constant::Infinity | Constant::Undefined)
        ) {
            return Ok(expr);
        }
        let f = self.fraction(expr)?;
        self.to_expr(&f)
    }

    /// Settled, normalized fraction for `id`, memoized for the pass.
    pub(crate) fn fraction(&mut self, id: ExprId) -> Result<Fraction, EngineError> {
        if let Some(f) = self.memo.get(&id) {
            return Ok(f.clone());
        }
        self.charge_nodes()?;
        let raw = self.convert(id)?;
        let f = self.finish(raw)?;
        self.memo.insert(id, f.clone());
        Ok(f)
    }

    fn convert(&mut self, id: ExprId) -> Result<Fraction, EngineError> {
        let f = match self.ctx.get(id).clone() {
            Expr::Number(n) => Fraction::constant(n),
            Expr::Constant(Constant::Pi | Constant::E) | Expr::Variable(_) => self.atom(id),
            Expr::Constant(Constant::Infinity | Constant::Undefined) => Fraction::undefined(),
            Expr::Add(l, r) => {
                let (a, b) = (self.fraction(l)?, self.fraction(r)?);
                a.add(&b, &mut self.budget)?
            }
            Expr::Sub(l, r) => {
                let (a, b) = (self.fraction(l)?, self.fraction(r)?);
                a.sub(&b, &mut self.budget)?
            }
            Expr::Mul(l, r) => {
                let (a, b) = (self.fraction(l)?, self.fraction(r)?);
                a.mul(&b, &mut self.budget)?
            }
            Expr::Div(l, r) => {
                let (a, b) = (self.fraction(l)?, self.fraction(r)?);
                a.div(&b, &mut self.budget)?
            }
            Expr::Neg(e) => self.fraction(e)?.neg(),
            Expr::Pow(b, e) => {
                let (base, exp) = (self.fraction(b)?, self.fraction(e)?);
                self.power(base, exp)?
            }
            Expr::Function(name, args) => self.function(&name, &args)?,
            Expr::Derivative { expr, wrt } => {
                let expr = self.simplify(expr)?;
                let key = self.ctx.add(Expr::Derivative { expr, wrt });
                self.atom(key)
            }
            Expr::Integral {
                integrand,
                var,
                bounds,
            } => {
                let integrand = self.simplify(integrand)?;
                let bounds = match bounds {
                    Some((lo, hi)) => Some((self.simplify(lo)?, self.simplify(hi)?)),
                    None => None,
                };
                let key = self.ctx.add(Expr::Integral {
                    integrand,
                    var,
                    bounds,
                });
                self.atom(key)
            }
        };
        Ok(f)
    }

    fn finish(&mut self, f: Fraction) -> Result<Fraction, EngineError> {
        let f = f.normalize(&mut self.budget)?;
        self.settle(f)
    }

    fn charge_nodes(&mut self) -> Result<(), BudgetExceeded> {
        let created = self.ctx.len().saturating_sub(self.nodes_at_start) as u64;
        self.budget
            .observe(Operation::Simplify, Metric::NodesCreated, created)
    }

    fn atom(&self, key: ExprId) -> Fraction {
        self.atom_pow(key, BigRational::one())
    }

    fn atom_pow(&self, key: ExprId, exp: BigRational) -> Fraction {
        Fraction::from_poly(Poly::atom(key, exp))
    }

    /// `f(args)` as an atom, arguments in canonical form.
    fn opaque_call(&mut self, name: &str, args: &[Fraction]) -> Result<Fraction, EngineError> {
        let mut exprs = Vec::with_capacity(args.len());
        for arg in args {
            exprs.push(self.to_expr(arg)?);
        }
        let key = self.ctx.call(name, exprs);
        Ok(self.atom(key))
    }

    /// Exponent `a` when `f` is exactly `E**a`.
    fn euler_power(&self, f: &Fraction) -> Option<BigRational> {
        if !f.is_polynomial() {
            return None;
        }
        match f.num.single_term() {
            Some((m, c)) if c.is_one() && m.len() == 1 && m[0].0 == self.euler => {
                Some(m[0].1.clone())
            }
            _ => None,
        }
    }

    fn sign(&self, id: ExprId) -> Sign {
        SignOracle::new(&*self.ctx, self.assumptions).sign(id)
    }

    fn is_real(&self, id: ExprId) -> bool {
        SignOracle::new(&*self.ctx, self.assumptions).is_real(id)
    }

    pub(crate) fn atom_kind(&self, id: ExprId) -> AtomKind {
        match self.ctx.get(id) {
            Expr::Number(n) => AtomKind::Numeric(n.clone()),
            Expr::Add(..) | Expr::Sub(..) | Expr::Mul(..) | Expr::Div(..) | Expr::Neg(_) => {
                AtomKind::Composite
            }
            Expr::Pow(_, e) if self.ctx.is_number(*e) => AtomKind::Composite,
            Expr::Function(name, args) => match (name.as_str(), args.as_slice()) {
                ("sin", [theta]) => AtomKind::Sin(*theta),
                ("Abs", [u]) => AtomKind::Abs(*u),
                _ => AtomKind::Other,
            },
            _ => AtomKind::Other,
        }
    }

    /// Canonical expression of a single term `c * m`.
    fn term_key(&mut self, m: &Monomial, c: BigRational) -> Result<ExprId, EngineError> {
        self.poly_expr(&Poly::term(m.clone(), c))
    }
}
