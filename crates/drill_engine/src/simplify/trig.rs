//! Trigonometric functions.
//!
//! The argument polynomial is split into pieces: a multiple of `pi`, a
//! rational constant, and one piece per remaining monomial `(p/q)*m`, which
//! becomes `|p|` times the base angle `m/q`. Each piece yields a
//! `(cos, sin)` pair; pieces combine with the angle-sum formulas. The
//! result is a polynomial in `sin`/`cos` of base angles, so identities
//! reduce to polynomial arithmetic plus `sin**2 = 1 - cos**2`.

use drill_ast::{Expr, ExprId};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use smallvec::smallvec;

use super::Simplifier;
use crate::error::EngineError;
use crate::poly::{lex_cmp, Fraction, Monomial};

/// Argument pieces beyond this are left as a single atom.
const MAX_PIECES: usize = 8;

type CosSin = (Fraction, Fraction);

fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(n.into(), d.into())
}

impl Simplifier<'_> {
    pub(super) fn trig(&mut self, name: &str, theta: &Fraction) -> Result<Fraction, EngineError> {
        let (cos, sin) = self.cos_sin(theta)?;
        let one = Fraction::integer(1);
        let b = &mut self.budget;
        Ok(match name {
            "sin" => sin,
            "cos" => cos,
            "tan" => sin.div(&cos, b)?,
            "cot" => cos.div(&sin, b)?,
            "sec" => one.div(&cos, b)?,
            _ => one.div(&sin, b)?,
        })
    }

    fn cos_sin(&mut self, theta: &Fraction) -> Result<CosSin, EngineError> {
        if theta.is_undefined() {
            return Ok((Fraction::undefined(), Fraction::undefined()));
        }
        if !theta.is_polynomial() {
            let arg = self.to_expr(theta)?;
            return Ok(self.cos_sin_atoms(arg));
        }

        let pi_mono: Monomial = smallvec![(self.pi, BigRational::one())];
        let mut pi_multiple = BigRational::zero();
        let mut constant = BigRational::zero();
        let mut pieces: Vec<(Monomial, BigRational)> = Vec::new();
        for (m, c) in theta.num.terms() {
            if m.is_empty() {
                constant = c.clone();
            } else if *m == pi_mono {
                pi_multiple = c.clone();
            } else {
                pieces.push((m.clone(), c.clone()));
            }
        }
        if pieces.len() + 2 > MAX_PIECES {
            let arg = self.to_expr(theta)?;
            return Ok(self.cos_sin_atoms(arg));
        }
        // stable combination order
        pieces.sort_by(|a, b| lex_cmp(&a.0, &b.0));

        let mut acc = self.pi_multiple(&pi_multiple)?;
        if !constant.is_zero() {
            let base = self.ctx.rational(constant.abs());
            let piece = self.piece(base, 1, constant.is_negative())?;
            acc = self.angle_sum(acc, piece)?;
        }
        for (m, c) in pieces {
            let (base, multiple) = self.base_angle(&m, &c)?;
            let piece = self.piece(base, multiple, c.is_negative())?;
            acc = self.angle_sum(acc, piece)?;
        }
        Ok(acc)
    }

    /// Base angle and multiple for `c*m`: `(p/q)*m` is `|p|` times `m/q`
    /// while `|p|` stays within the configured multiple limit.
    fn base_angle(&mut self, m: &Monomial, c: &BigRational) -> Result<(ExprId, u32), EngineError> {
        let p = c.numer().abs();
        match p.to_u32().filter(|p| *p <= self.limits.max_trig_multiple) {
            Some(multiple) => {
                let base = self.term_key(m, BigRational::new(BigInt::one(), c.denom().clone()))?;
                Ok((base, multiple))
            }
            None => Ok((self.term_key(m, c.abs())?, 1)),
        }
    }

    /// `(cos, sin)` of `multiple * base`, negated angle when `negative`.
    fn piece(&mut self, base: ExprId, multiple: u32, negative: bool) -> Result<CosSin, EngineError> {
        let (c1, s1) = self.base_cos_sin(base)?;
        let (mut c, mut s) = (c1.clone(), s1.clone());
        for _ in 1..multiple {
            let b = &mut self.budget;
            let next_c = c.mul(&c1, b)?.sub(&s.mul(&s1, b)?, b)?;
            let next_s = s.mul(&c1, b)?.add(&c.mul(&s1, b)?, b)?;
            c = next_c;
            s = next_s;
        }
        if negative {
            s = s.neg();
        }
        Ok((c, s))
    }

    fn angle_sum(&mut self, (c1, s1): CosSin, (c2, s2): CosSin) -> Result<CosSin, EngineError> {
        let b = &mut self.budget;
        let c = c1.mul(&c2, b)?.sub(&s1.mul(&s2, b)?, b)?;
        let s = s1.mul(&c2, b)?.add(&c1.mul(&s2, b)?, b)?;
        Ok((c, s))
    }

    /// `(cos, sin)` of a base angle; inverse functions cancel.
    fn base_cos_sin(&mut self, base: ExprId) -> Result<CosSin, EngineError> {
        let inverse = match self.ctx.get(base) {
            Expr::Function(name, args) if args.len() == 1 => match name.as_str() {
                "asin" | "acos" | "atan" => Some((name.clone(), args[0])),
                _ => None,
            },
            _ => None,
        };
        let Some((name, v)) = inverse else {
            return Ok(self.cos_sin_atoms(base));
        };

        let v = self.fraction(v)?;
        let square = v.mul(&v, &mut self.budget)?;
        let one = Fraction::integer(1);
        let half = ratio(1, 2);
        Ok(match name.as_str() {
            // sqrt(1 - v**2)
            "asin" | "acos" => {
                let diff = one.sub(&square, &mut self.budget)?;
                let root = self.pow_rational(diff, &half)?;
                if name == "asin" {
                    (root, v)
                } else {
                    (v, root)
                }
            }
            // 1/sqrt(1 + v**2)
            _ => {
                let sum = one.add(&square, &mut self.budget)?;
                let inv_root = self.pow_rational(sum, &-half)?;
                let sin = v.mul(&inv_root, &mut self.budget)?;
                (inv_root, sin)
            }
        })
    }

    fn cos_sin_atoms(&mut self, arg: ExprId) -> CosSin {
        let cos = self.ctx.call("cos", vec![arg]);
        let sin = self.ctx.call("sin", vec![arg]);
        (self.atom(cos), self.atom(sin))
    }

    /// `(cos, sin)` of `r*pi`, exact when `r` reduces to a multiple of
    /// `1/6` or `1/4`.
    fn pi_multiple(&mut self, r: &BigRational) -> Result<CosSin, EngineError> {
        let two = BigRational::from_integer(2.into());
        let r = r - (r / &two).floor() * &two;
        if r.is_zero() {
            return Ok((Fraction::integer(1), Fraction::integer(0)));
        }

        if let (Some(sin), Some(cos)) = (
            self.sin_pi_exact(&r)?,
            self.sin_pi_exact(&(&r + ratio(1, 2)))?,
        ) {
            return Ok((cos, sin));
        }

        let pi_mono: Monomial = smallvec![(self.pi, BigRational::one())];
        let (base, multiple) = self.base_angle(&pi_mono, &r)?;
        self.piece(base, multiple, false)
    }

    /// `sin(t*pi)` when it has a closed form.
    fn sin_pi_exact(&mut self, t: &BigRational) -> Result<Option<Fraction>, EngineError> {
        let two = BigRational::from_integer(2.into());
        let mut t = t - (t / &two).floor() * &two;
        let mut sign = BigRational::one();
        if t > BigRational::one() {
            t -= BigRational::one();
            sign = -sign;
        }
        if t > ratio(1, 2) {
            t = BigRational::one() - t;
        }

        let value = if t.is_zero() {
            Fraction::integer(0)
        } else if t == ratio(1, 6) {
            Fraction::constant(ratio(1, 2))
        } else if t == ratio(1, 4) {
            self.surd(2, ratio(1, 2))?
        } else if t == ratio(1, 3) {
            self.surd(3, ratio(1, 2))?
        } else if t == ratio(1, 2) {
            Fraction::integer(1)
        } else {
            return Ok(None);
        };
        Ok(Some(value.mul(&Fraction::constant(sign), &mut self.budget)?))
    }
}
