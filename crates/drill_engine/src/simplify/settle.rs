//! Rewrites between atoms that polynomial arithmetic alone cannot see.
//!
//! - integer and composite bases keep exponents in `(0, 1)`; the integer
//!   part is multiplied out (`2**(3/2) -> 2*2**(1/2)`)
//! - `sin(t)**k` for `|k| >= 2` is rewritten over `cos(t)`
//! - `Abs(u)**(2k)` for real `u` drops the bars
//! - a two-term denominator with one square root is rationalized

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::numeric::split_exponent;
use super::{AtomKind, Simplifier};
use crate::error::EngineError;
use crate::poly::{rational_pow, Fraction, Monomial, Poly};

/// Rounds of rewriting before the fraction is returned as is.
const SETTLE_ROUNDS: usize = 8;

impl Simplifier<'_> {
    pub(super) fn settle(&mut self, mut f: Fraction) -> Result<Fraction, EngineError> {
        for _ in 0..SETTLE_ROUNDS {
            if f.is_undefined() {
                return Ok(f);
            }
            let num = self.settle_poly(&f.num)?;
            let den = self.settle_poly(&f.den)?;
            if num.is_none() && den.is_none() {
                match self.rationalize(&f)? {
                    Some(next) => {
                        f = next;
                        continue;
                    }
                    None => return Ok(f),
                }
            }
            let num = num.unwrap_or_else(|| Fraction::from_poly(f.num.clone()));
            let den = den.unwrap_or_else(|| Fraction::from_poly(f.den.clone()));
            f = num
                .div(&den, &mut self.budget)?
                .normalize(&mut self.budget)?;
        }
        Ok(f)
    }

    /// `None` when no term needs rewriting.
    fn settle_poly(&mut self, p: &Poly) -> Result<Option<Fraction>, EngineError> {
        let mut kept = Poly::zero();
        let mut rewritten: Option<Fraction> = None;
        for (m, c) in p.terms() {
            match self.settle_term(m, c)? {
                Some(term) => {
                    rewritten = Some(match rewritten {
                        Some(acc) => acc.add(&term, &mut self.budget)?,
                        None => term,
                    });
                }
                None => kept.add_term(m.clone(), c.clone()),
            }
        }
        match rewritten {
            Some(acc) => Ok(Some(acc.add(&Fraction::from_poly(kept), &mut self.budget)?)),
            None => Ok(None),
        }
    }

    fn settle_term(&mut self, m: &Monomial, c: &BigRational) -> Result<Option<Fraction>, EngineError> {
        let mut changed = false;
        let mut coeff = c.clone();
        let mut keep = Monomial::new();
        let mut extra: Vec<Fraction> = Vec::new();

        for (a, e) in m {
            let in_unit = e.is_positive() && *e < BigRational::one();
            match self.atom_kind(*a) {
                AtomKind::Numeric(n) if !in_unit => {
                    let (k, frac) = split_exponent(e);
                    coeff *= rational_pow(&n, &k, &mut self.budget)?;
                    if !frac.is_zero() {
                        keep.push((*a, frac));
                    }
                    changed = true;
                }
                AtomKind::Composite if !in_unit => {
                    let (k, frac) = split_exponent(e);
                    let base = self.fraction(*a)?;
                    extra.push(base.pow_int(&k, &mut self.budget)?);
                    if !frac.is_zero() {
                        keep.push((*a, frac));
                    }
                    changed = true;
                }
                AtomKind::Sin(theta) if e.is_integer() && e.abs() >= BigRational::from_integer(2.into()) => {
                    // sin**k = sin**(k - 2j) * (1 - cos**2)**j, j = k/2 toward zero
                    let k = e.to_integer();
                    let j = &k / BigInt::from(2);
                    let r = &k - &j * BigInt::from(2);
                    let cos = self.ctx.call("cos", vec![theta]);
                    let cos_sq = Poly::atom(cos, BigRational::from_integer(2.into()));
                    let one_minus = Fraction::from_poly(Poly::one().sub(&cos_sq));
                    extra.push(one_minus.pow_int(&j, &mut self.budget)?);
                    if !r.is_zero() {
                        keep.push((*a, BigRational::from_integer(r)));
                    }
                    changed = true;
                }
                AtomKind::Abs(u)
                    if e.is_integer() && e.to_integer().is_even() && self.is_real(u) =>
                {
                    let base = self.fraction(u)?;
                    extra.push(base.pow_int(&e.to_integer(), &mut self.budget)?);
                    changed = true;
                }
                _ => keep.push((*a, e.clone())),
            }
        }

        if !changed {
            return Ok(None);
        }
        let mut result = Fraction::from_poly(Poly::term(keep, coeff));
        for factor in extra {
            result = result.mul(&factor, &mut self.budget)?;
        }
        Ok(Some(result))
    }

    /// `n / (a + b*sqrt(p))` becomes `n*(a - b*sqrt(p)) / (a**2 - b**2*p)`.
    fn rationalize(&mut self, f: &Fraction) -> Result<Option<Fraction>, EngineError> {
        if f.den.len() != 2 {
            return Ok(None);
        }
        let half = BigRational::new(1.into(), 2.into());
        let with_root: Vec<bool> = f
            .den
            .terms()
            .map(|(m, _)| {
                m.iter()
                    .any(|(a, e)| *e == half && matches!(self.atom_kind(*a), AtomKind::Numeric(_)))
            })
            .collect();
        if with_root.iter().filter(|r| **r).count() != 1 {
            return Ok(None);
        }

        let mut conjugate = Poly::zero();
        for ((m, c), root) in f.den.terms().zip(&with_root) {
            let c = if *root { -c.clone() } else { c.clone() };
            conjugate.add_term(m.clone(), c);
        }
        let conjugate = Fraction::from_poly(conjugate);
        let num = Fraction::from_poly(f.num.clone()).mul(&conjugate, &mut self.budget)?;
        let den = Fraction::from_poly(f.den.clone()).mul(&conjugate, &mut self.budget)?;
        let den = self.settle(den)?;
        Ok(Some(
            num.div(&den, &mut self.budget)?
                .normalize(&mut self.budget)?,
        ))
    }
}
