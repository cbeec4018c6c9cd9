//! Rebuild expressions from fractions.
//!
//! Output is deterministic: terms are ordered by total degree (highest
//! first) and then structurally, factors structurally. Converting the
//! output back yields the same fraction, which is what makes a second pass
//! a no-op.

use std::cmp::Ordering;

use drill_ast::ordering::compare_expr;
use drill_ast::{Constant, Expr, ExprId};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::Simplifier;
use crate::build::{add2_raw, div2_raw, mul_many_raw, neg_raw, pow2_raw, sub2_raw};
use crate::error::EngineError;
use crate::poly::{Fraction, Monomial, Poly};

struct Term {
    degree: BigRational,
    shape: ExprId,
    negative: bool,
    body: ExprId,
}

impl Simplifier<'_> {
    pub(crate) fn to_expr(&mut self, f: &Fraction) -> Result<ExprId, EngineError> {
        if f.is_undefined() {
            return Ok(self.ctx.constant(Constant::Undefined));
        }
        let num = self.poly_expr(&f.num)?;
        if f.den.is_one() {
            return Ok(num);
        }
        let den = self.poly_expr(&f.den)?;
        Ok(div2_raw(self.ctx, num, den))
    }

    pub(crate) fn poly_expr(&mut self, p: &Poly) -> Result<ExprId, EngineError> {
        if p.is_zero() {
            return Ok(self.ctx.num(0));
        }

        let mut terms = Vec::with_capacity(p.len());
        for (m, c) in p.terms() {
            let degree = m
                .iter()
                .fold(BigRational::zero(), |acc, (_, e)| acc + e);
            let shape = self.term_expr(m, &BigRational::one())?;
            let body = self.term_expr(m, &c.abs())?;
            terms.push(Term {
                degree,
                shape,
                negative: c.is_negative(),
                body,
            });
        }
        let ctx = &*self.ctx;
        terms.sort_by(|a, b| match b.degree.cmp(&a.degree) {
            Ordering::Equal => compare_expr(ctx, a.shape, b.shape),
            other => other,
        });

        let mut iter = terms.into_iter();
        let Some(first) = iter.next() else {
            return Ok(self.ctx.num(0));
        };
        let mut acc = if first.negative {
            neg_raw(self.ctx, first.body)
        } else {
            first.body
        };
        for term in iter {
            acc = if term.negative {
                sub2_raw(self.ctx, acc, term.body)
            } else {
                add2_raw(self.ctx, acc, term.body)
            };
        }
        Ok(acc)
    }

    /// `c * m` for `c > 0`, negative exponents moved under a division.
    fn term_expr(&mut self, m: &Monomial, c: &BigRational) -> Result<ExprId, EngineError> {
        let mut numer = Vec::new();
        let mut denom = Vec::new();
        for (a, e) in m {
            if let Some(folded) = self.folded_power(*a, e)? {
                numer.push(folded);
            } else if e.is_positive() {
                numer.push(self.power_expr(*a, e));
            } else {
                denom.push(self.power_expr(*a, &-e.clone()));
            }
        }
        {
            let ctx = &*self.ctx;
            numer.sort_by(|a, b| compare_expr(ctx, *a, *b));
            denom.sort_by(|a, b| compare_expr(ctx, *a, *b));
        }

        let p = c.numer();
        let q = c.denom();
        if !p.is_one() || numer.is_empty() {
            numer.insert(0, self.integer(p));
        }
        if !q.is_one() {
            denom.insert(0, self.integer(q));
        }

        let top = match mul_many_raw(self.ctx, &numer) {
            Some(top) => top,
            None => self.ctx.num(1),
        };
        match mul_many_raw(self.ctx, &denom) {
            Some(bottom) => Ok(div2_raw(self.ctx, top, bottom)),
            None => Ok(top),
        }
    }

    /// `exp(m)**c` prints as `exp(c*m)` and `b**m` raised to `c` as
    /// `b**(c*m)`, when `m` is a plain monomial.
    fn folded_power(&mut self, a: ExprId, e: &BigRational) -> Result<Option<ExprId>, EngineError> {
        match self.ctx.get(a).clone() {
            Expr::Function(name, args) if name == "exp" && args.len() == 1 => {
                let Some(scaled) = self.scaled_monomial(args[0], e)? else {
                    return Ok(None);
                };
                Ok(Some(self.ctx.call("exp", vec![scaled])))
            }
            Expr::Pow(base, exp) if !self.ctx.is_number(exp) => {
                let Some(scaled) = self.scaled_monomial(exp, e)? else {
                    return Ok(None);
                };
                Ok(Some(pow2_raw(self.ctx, base, scaled)))
            }
            _ => Ok(None),
        }
    }

    /// `e * m` as an expression when `id` is a unit monomial `m`.
    fn scaled_monomial(&mut self, id: ExprId, e: &BigRational) -> Result<Option<ExprId>, EngineError> {
        let f = self.fraction(id)?;
        if !f.is_polynomial() {
            return Ok(None);
        }
        match f.num.single_term() {
            Some((m, c)) if c.is_one() => {
                let m = m.clone();
                Ok(Some(self.term_key(&m, e.clone())?))
            }
            _ => Ok(None),
        }
    }

    fn power_expr(&mut self, a: ExprId, e: &BigRational) -> ExprId {
        if e.is_one() {
            return a;
        }
        let exp = self.ctx.rational(e.clone());
        pow2_raw(self.ctx, a, exp)
    }

    fn integer(&mut self, n: &BigInt) -> ExprId {
        self.ctx.rational(BigRational::from_integer(n.clone()))
    }
}
