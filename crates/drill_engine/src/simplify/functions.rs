//! Elementary functions: `exp`, `log`, `Abs`, roots, factorial, inverse
//! trigonometric and hyperbolic functions. Trigonometric functions live in
//! `trig.rs`.

use drill_ast::{Expr, ExprId};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::numeric::{factor_integer, factorial};
use super::Simplifier;
use crate::error::EngineError;
use crate::poly::{mono_mul, Fraction, Monomial, Poly};

fn half() -> BigRational {
    BigRational::new(1.into(), 2.into())
}

fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(n.into(), d.into())
}

impl Simplifier<'_> {
    pub(super) fn function(&mut self, name: &str, args: &[ExprId]) -> Result<Fraction, EngineError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.fraction(*arg)?);
        }
        if values.iter().any(Fraction::is_undefined) {
            return Ok(Fraction::undefined());
        }

        match (name, values.as_slice()) {
            ("sqrt", [u]) => self.pow_rational(u.clone(), &half()),
            ("root", [u, n]) => {
                let inverse = Fraction::integer(1).div(n, &mut self.budget)?;
                self.power(u.clone(), inverse)
            }
            ("exp", [u]) => self.exp_of(u.clone()),
            ("log", [u]) => self.log_of(u),
            ("log", [u, b]) => {
                let num = self.log_of(u)?;
                let den = self.log_of(b)?;
                Ok(num.div(&den, &mut self.budget)?)
            }
            ("Abs", [u]) => self.abs_of(u),
            ("factorial", [u]) => self.factorial_of(u),
            ("sin" | "cos" | "tan" | "cot" | "sec" | "csc", [u]) => self.trig(name, u),
            ("asin" | "acos" | "atan", [u]) => self.inverse_trig(name, u),
            ("sinh" | "cosh" | "tanh", [u]) => self.hyperbolic(name, u),
            _ => self.opaque_call(name, &values),
        }
    }

    /// `exp(u)`: constants fold into powers of `E`, every other monomial
    /// `c*m` becomes `exp(m)**c`, and `exp(c*log(w))` is `w**c`.
    pub(super) fn exp_of(&mut self, u: Fraction) -> Result<Fraction, EngineError> {
        if u.is_undefined() {
            return Ok(u);
        }
        if !u.is_polynomial() {
            return self.opaque_call("exp", &[u]);
        }

        let terms: Vec<(Monomial, BigRational)> =
            u.num.terms().map(|(m, c)| (m.clone(), c.clone())).collect();
        let mut result = Fraction::integer(1);
        for (m, c) in terms {
            let factor = if m.is_empty() {
                self.atom_pow(self.euler, c)
            } else if let Some(w) = self.log_argument(&m) {
                let w = self.fraction(w)?;
                self.pow_rational(w, &c)?
            } else {
                let arg = self.term_key(&m, BigRational::one())?;
                let key = self.ctx.call("exp", vec![arg]);
                self.atom_pow(key, c)
            };
            result = result.mul(&factor, &mut self.budget)?;
        }
        Ok(result)
    }

    /// `w` when `m` is exactly `log(w)`.
    fn log_argument(&self, m: &Monomial) -> Option<ExprId> {
        match m.as_slice() {
            [(a, e)] if e.is_one() => match self.ctx.get(*a) {
                Expr::Function(name, args) if name == "log" && args.len() == 1 => Some(args[0]),
                _ => None,
            },
            _ => None,
        }
    }

    /// `log(u)`, expanded over positive factors.
    fn log_of(&mut self, u: &Fraction) -> Result<Fraction, EngineError> {
        if u.is_undefined() || u.is_zero() {
            return Ok(Fraction::undefined());
        }
        if !u.is_polynomial() {
            return self.opaque_call("log", std::slice::from_ref(u));
        }
        if let Some((m, c)) = u.num.single_term() {
            let (m, c) = (m.clone(), c.clone());
            return self.log_term(&m, &c);
        }
        // log(g*P) = log(g) + log(P) for the positive content g
        let g = u.num.content();
        let rest = Fraction::from_poly(u.num.scale(&g.recip()));
        let numeric = self.log_rational(&g)?;
        let opaque = self.opaque_call("log", &[rest])?;
        Ok(numeric.add(&opaque, &mut self.budget)?)
    }

    fn log_term(&mut self, m: &Monomial, c: &BigRational) -> Result<Fraction, EngineError> {
        let mut result = self.log_rational(&c.abs())?;
        let mut rest = Monomial::new();
        for (a, e) in m {
            let e_frac = Fraction::constant(e.clone());
            let piece = if *a == self.euler {
                e_frac
            } else if let Some(arg) = self.real_exp_argument(*a) {
                let arg = self.fraction(arg)?;
                arg.mul(&e_frac, &mut self.budget)?
            } else if self.sign(*a).is_positive() {
                let key = self.ctx.call("log", vec![*a]);
                self.atom(key).mul(&e_frac, &mut self.budget)?
            } else {
                rest.push((*a, e.clone()));
                continue;
            };
            result = result.add(&piece, &mut self.budget)?;
        }
        if !rest.is_empty() || c.is_negative() {
            let sign = if c.is_negative() {
                -BigRational::one()
            } else {
                BigRational::one()
            };
            let key = self.term_key(&rest, sign)?;
            let key = self.ctx.call("log", vec![key]);
            result = result.add(&self.atom(key), &mut self.budget)?;
        }
        Ok(result)
    }

    /// `v` when `a` is `exp(v)` with `v` real.
    fn real_exp_argument(&self, a: ExprId) -> Option<ExprId> {
        match self.ctx.get(a) {
            Expr::Function(name, args) if name == "exp" && args.len() == 1 => {
                self.is_real(args[0]).then_some(args[0])
            }
            _ => None,
        }
    }

    /// `log(c)` for `c > 0` as a combination of `log(p)` over primes.
    fn log_rational(&mut self, c: &BigRational) -> Result<Fraction, EngineError> {
        let mut result = Poly::zero();
        if c.is_one() {
            return Ok(Fraction::from_poly(result));
        }
        let (numer_factors, numer_rest) = factor_integer(c.numer());
        let (denom_factors, denom_rest) = factor_integer(c.denom());
        let mut terms: Vec<(BigInt, BigRational)> = Vec::new();
        for (p, k) in numer_factors {
            terms.push((p, BigRational::from_integer(k.into())));
        }
        for (p, k) in denom_factors {
            terms.push((p, -BigRational::from_integer(k.into())));
        }
        if !numer_rest.is_one() {
            terms.push((numer_rest, BigRational::one()));
        }
        if !denom_rest.is_one() {
            terms.push((denom_rest, -BigRational::one()));
        }
        for (p, k) in terms {
            let n = self.ctx.rational(BigRational::from_integer(p));
            let key = self.ctx.call("log", vec![n]);
            result.add_term(smallvec::smallvec![(key, BigRational::one())], k);
        }
        Ok(Fraction::from_poly(result))
    }

    /// `Abs(u)`: numbers fold, products split factor by factor, sums with a
    /// known sign lose the bars.
    fn abs_of(&mut self, u: &Fraction) -> Result<Fraction, EngineError> {
        if u.is_undefined() {
            return Ok(Fraction::undefined());
        }
        if !u.is_polynomial() {
            let num = self.abs_poly(&u.num)?;
            let den = self.abs_poly(&u.den)?;
            return Ok(num.div(&den, &mut self.budget)?);
        }
        self.abs_poly(&u.num)
    }

    fn abs_poly(&mut self, p: &Poly) -> Result<Fraction, EngineError> {
        if let Some(c) = p.as_constant() {
            return Ok(Fraction::constant(c.abs()));
        }
        if let Some((m, c)) = p.single_term() {
            let (m, mut c) = (m.clone(), c.abs());
            let mut out = Monomial::new();
            for (a, e) in &m {
                let even = e.is_integer() && e.to_integer().is_even();
                let sign = self.sign(*a);
                let factor = if sign.is_nonnegative() || (even && self.is_real(*a)) {
                    *a
                } else if sign.is_nonpositive() && e.is_integer() {
                    // |a**k| = (-1)**k * a**k for a <= 0
                    c = -c;
                    *a
                } else {
                    self.ctx.call("Abs", vec![*a])
                };
                out = mono_mul(&out, &smallvec::smallvec![(factor, e.clone())]);
            }
            return Ok(Fraction::from_poly(Poly::term(out, c)));
        }

        let expr = self.poly_expr(p)?;
        let sign = self.sign(expr);
        if sign.is_nonnegative() {
            return Ok(Fraction::from_poly(p.clone()));
        }
        if sign.is_nonpositive() {
            return Ok(Fraction::from_poly(p.neg()));
        }

        // |g*P| = g*|P|, with P's leading coefficient made positive
        let g = p.content();
        let mut rest = p.scale(&g.recip());
        let leading_negative = rest
            .leading_term()
            .is_some_and(|(_, c)| c.is_negative());
        if leading_negative {
            rest = rest.neg();
        }
        let bars = self.opaque_call("Abs", &[Fraction::from_poly(rest)])?;
        Ok(bars.mul(&Fraction::constant(g), &mut self.budget)?)
    }

    fn factorial_of(&mut self, u: &Fraction) -> Result<Fraction, EngineError> {
        if let Some(n) = u.as_constant().filter(|n| n.is_integer()) {
            if n.is_negative() {
                return Ok(Fraction::undefined());
            }
            if let Some(value) = factorial(&n.to_integer(), &mut self.budget)? {
                return Ok(Fraction::constant(BigRational::from_integer(value)));
            }
        }
        self.opaque_call("factorial", std::slice::from_ref(u))
    }

    /// Exact values of `asin`, `acos`, `atan` at the standard points, odd
    /// symmetry for numeric arguments, otherwise an atom.
    fn inverse_trig(&mut self, name: &str, u: &Fraction) -> Result<Fraction, EngineError> {
        let table: Vec<(Fraction, BigRational)> = match name {
            "atan" => vec![
                (Fraction::integer(0), BigRational::zero()),
                (self.surd(3, ratio(1, 3))?, ratio(1, 6)),
                (Fraction::integer(1), ratio(1, 4)),
                (self.surd(3, BigRational::one())?, ratio(1, 3)),
            ],
            _ => vec![
                (Fraction::integer(0), BigRational::zero()),
                (Fraction::constant(half()), ratio(1, 6)),
                (self.surd(2, half())?, ratio(1, 4)),
                (self.surd(3, half())?, ratio(1, 3)),
                (Fraction::integer(1), half()),
            ],
        };

        let negated = u.neg();
        let hit = table.iter().find_map(|(value, angle)| {
            if value == u {
                Some(angle.clone())
            } else if *value == negated {
                Some(-angle.clone())
            } else {
                None
            }
        });

        match hit {
            Some(angle) => {
                // acos(v) = pi/2 - asin(v)
                let multiple = if name == "acos" { half() - angle } else { angle };
                Ok(self.atom(self.pi).mul(&Fraction::constant(multiple), &mut self.budget)?)
            }
            None => self.opaque_call(name, std::slice::from_ref(u)),
        }
    }

    /// `k * sqrt(n)` in canonical form.
    pub(super) fn surd(&mut self, n: i64, k: BigRational) -> Result<Fraction, EngineError> {
        let root = self.numeric_power(&BigRational::from_integer(n.into()), &half())?;
        Ok(root.mul(&Fraction::constant(k), &mut self.budget)?)
    }

    fn hyperbolic(&mut self, name: &str, u: &Fraction) -> Result<Fraction, EngineError> {
        let up = self.exp_of(u.clone())?;
        let down = self.exp_of(u.neg())?;
        let halve = Fraction::constant(half());
        let sinh = up.sub(&down, &mut self.budget)?.mul(&halve, &mut self.budget)?;
        let cosh = up.add(&down, &mut self.budget)?.mul(&halve, &mut self.budget)?;
        Ok(match name {
            "sinh" => sinh,
            "cosh" => cosh,
            _ => sinh.div(&cosh, &mut self.budget)?,
        })
    }
}
