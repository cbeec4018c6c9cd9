//! Powers: integer powers expand, fractional powers split where the
//! principal branch allows it, symbolic exponents become atoms.

use drill_ast::{Expr, ExprId};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use smallvec::smallvec;

use super::numeric::{factor_integer, split_exponent};
use super::Simplifier;
use crate::error::EngineError;
use crate::poly::{mono_mul, rational_pow, Fraction, Monomial, Poly};

impl Simplifier<'_> {
    pub(super) fn power(&mut self, base: Fraction, exp: Fraction) -> Result<Fraction, EngineError> {
        if base.is_undefined() || exp.is_undefined() {
            return Ok(Fraction::undefined());
        }
        if let Some(a) = self.euler_power(&base) {
            // (E**a)**u = exp(a*u)
            let scaled = exp.mul(&Fraction::constant(a), &mut self.budget)?;
            return self.exp_of(scaled);
        }
        if let Some(q) = exp.as_constant() {
            return self.pow_rational(base, &q);
        }
        self.pow_symbolic(base, exp)
    }

    /// `base**q` for a rational `q`.
    pub(super) fn pow_rational(&mut self, base: Fraction, q: &BigRational) -> Result<Fraction, EngineError> {
        if base.is_undefined() {
            return Ok(base);
        }
        if q.is_integer() {
            return Ok(base.pow_int(&q.to_integer(), &mut self.budget)?);
        }
        if base.is_zero() {
            return Ok(if q.is_positive() {
                base
            } else {
                Fraction::undefined()
            });
        }
        if !base.is_polynomial() {
            return self.opaque_power(&base, q);
        }
        if let Some((m, c)) = base.num.single_term() {
            let (m, c) = (m.clone(), c.clone());
            return self.pow_term(&m, &c, q);
        }

        // (g*P)**q = g**q * P**q for the positive content g
        let g = base.num.content();
        let rest = Fraction::from_poly(base.num.scale(&g.recip()));
        let numeric = self.numeric_power(&g, q)?;
        let opaque = self.opaque_power(&rest, q)?;
        Ok(numeric.mul(&opaque, &mut self.budget)?)
    }

    /// `base**q` kept whole: the canonical base becomes an atom.
    fn opaque_power(&mut self, base: &Fraction, q: &BigRational) -> Result<Fraction, EngineError> {
        let key = self.to_expr(base)?;
        Ok(self.atom_pow(key, q.clone()))
    }

    /// `(c * m)**q` for non-integer `q`.
    ///
    /// Nonnegative factors split off freely. The remaining factors split
    /// only when a single one of exponent in `(-1, 1]` is left; otherwise
    /// they are raised together as one atom.
    fn pow_term(&mut self, m: &Monomial, c: &BigRational, q: &BigRational) -> Result<Fraction, EngineError> {
        let mut split = Monomial::new();
        let mut rest = Monomial::new();
        let mut negate = false;

        for (a, e) in m {
            if self.sign(*a).is_nonnegative() {
                split = mono_mul(&split, &smallvec![(*a, e * q)]);
            } else if e.is_integer() && e.to_integer().is_even() && self.is_real(*a) {
                // (a**(2k))**q = |a|**(2k*q) for real a
                let eq = e * q;
                let factor = if eq.is_integer() && eq.to_integer().is_even() {
                    *a
                } else if eq.is_integer() && self.sign(*a).is_nonpositive() {
                    // |a|**k = -(a**k) for odd k and a <= 0
                    negate = !negate;
                    *a
                } else {
                    self.ctx.call("Abs", vec![*a])
                };
                split = mono_mul(&split, &smallvec![(factor, eq)]);
            } else {
                rest.push((*a, e.clone()));
            }
        }

        let negative = c.is_negative();
        let one = BigRational::one();
        let lone_factor = match rest.as_slice() {
            [(a, e)] if !negative && *e > -one.clone() && *e <= one => Some((*a, e * q)),
            _ => None,
        };
        match lone_factor {
            Some(factor) => split = mono_mul(&split, &smallvec![factor]),
            None if !rest.is_empty() || negative => {
                let sign = if negative { -one } else { one };
                let key = self.term_key(&rest, sign)?;
                split = mono_mul(&split, &smallvec![(key, q.clone())]);
            }
            None => {}
        }

        let coeff = self.numeric_power(&c.abs(), q)?;
        let factors = Fraction::from_poly(Poly::term(split, BigRational::one()));
        let result = factors.mul(&coeff, &mut self.budget)?;
        Ok(if negate { result.neg() } else { result })
    }

    /// `c**q` for `c > 0`: each prime power splits into an integer part and
    /// an atom `p**f` with `0 < f < 1`.
    pub(super) fn numeric_power(&mut self, c: &BigRational, q: &BigRational) -> Result<Fraction, EngineError> {
        if c.is_one() {
            return Ok(Fraction::integer(1));
        }
        let mut coeff = BigRational::one();
        let mut mono = Monomial::new();

        let (numer_factors, numer_rest) = factor_integer(c.numer());
        let (denom_factors, denom_rest) = factor_integer(c.denom());
        let mut powers: Vec<(BigInt, BigRational)> = Vec::new();
        for (p, k) in numer_factors {
            powers.push((p, q * BigRational::from_integer(k.into())));
        }
        for (p, k) in denom_factors {
            powers.push((p, -(q * BigRational::from_integer(k.into()))));
        }
        if !numer_rest.is_one() {
            powers.push((numer_rest, q.clone()));
        }
        if !denom_rest.is_one() {
            powers.push((denom_rest, -q.clone()));
        }

        for (p, e) in powers {
            let (k, frac) = split_exponent(&e);
            let base = BigRational::from_integer(p.clone());
            coeff *= rational_pow(&base, &k, &mut self.budget)?;
            if !frac.is_zero() {
                let key = self.ctx.rational(base);
                mono = mono_mul(&mono, &smallvec![(key, frac)]);
            }
        }
        Ok(Fraction::from_poly(Poly::term(mono, coeff)))
    }

    /// `base**u` for a non-constant exponent. Each monomial of `u` gives an
    /// atom `base**m`; the constant part of `u` goes through the rational
    /// path.
    fn pow_symbolic(&mut self, base: Fraction, exp: Fraction) -> Result<Fraction, EngineError> {
        if base.num.is_one() && base.den.is_one() {
            return Ok(base);
        }
        let b = self.to_expr(&base)?;
        if !exp.is_polynomial() {
            let e = self.to_expr(&exp)?;
            let key = self.ctx.add(Expr::Pow(b, e));
            return Ok(self.atom(key));
        }

        let terms: Vec<(Monomial, BigRational)> = exp
            .num
            .terms()
            .map(|(m, c)| (m.clone(), c.clone()))
            .collect();
        let mut result = Fraction::integer(1);
        for (m, c) in terms {
            let factor = if m.is_empty() {
                self.pow_rational(base.clone(), &c)?
            } else {
                let key = self.symbolic_power_key(b, &m)?;
                self.atom_pow(key, c)
            };
            result = result.mul(&factor, &mut self.budget)?;
        }
        Ok(result)
    }

    fn symbolic_power_key(&mut self, base: ExprId, m: &Monomial) -> Result<ExprId, EngineError> {
        let exponent = self.term_key(m, BigRational::one())?;
        Ok(self.ctx.add(Expr::Pow(base, exponent)))
    }
}
