//! Sparse multivariate polynomials over Q with rational exponents.
//!
//! Representation: a monomial is a sorted list of `(atom, exponent)` pairs
//! with nonzero exponents; a polynomial maps monomials to nonzero rational
//! coefficients. Atoms are `ExprId`s of canonical non-arithmetic subterms,
//! so two polynomials are equal iff they denote the same expression over
//! those atoms.
//!
//! [`Fraction`] pairs a numerator and denominator. A zero denominator marks
//! an undefined value and is absorbing under every operation.

use std::cmp::Ordering;

use drill_ast::ExprId;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::budget::{Budget, BudgetExceeded, Metric, Operation};

pub type Monomial = SmallVec<[(ExprId, BigRational); 4]>;

/// Product of two monomials. Exponents of shared atoms add; zeros vanish.
pub fn mono_mul(a: &Monomial, b: &Monomial) -> Monomial {
    let mut out = Monomial::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => {
                out.push(a[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j].clone());
                j += 1;
            }
            Ordering::Equal => {
                let e = &a[i].1 + &b[j].1;
                if !e.is_zero() {
                    out.push((a[i].0, e));
                }
                i += 1;
                j += 1;
            }
        }
    }
    out.extend(a[i..].iter().cloned());
    out.extend(b[j..].iter().cloned());
    out
}

/// Every exponent scaled by `k`.
pub fn mono_scale(m: &Monomial, k: &BigRational) -> Monomial {
    if k.is_zero() {
        return Monomial::new();
    }
    m.iter().map(|(a, e)| (*a, e * k)).collect()
}

pub fn mono_inv(m: &Monomial) -> Monomial {
    m.iter().map(|(a, e)| (*a, -e.clone())).collect()
}

/// Lexicographic order on dense exponent vectors (atoms ascending, absent
/// atoms have exponent 0). Total and compatible with multiplication.
pub fn lex_cmp(a: &Monomial, b: &Monomial) -> Ordering {
    let zero = BigRational::zero();
    let (mut i, mut j) = (0, 0);
    loop {
        match (a.get(i), b.get(j)) {
            (None, None) => return Ordering::Equal,
            (Some((_, ea)), None) => return ea.cmp(&zero),
            (None, Some((_, eb))) => return zero.cmp(eb),
            (Some((ia, ea)), Some((ib, eb))) => match ia.cmp(ib) {
                Ordering::Less => return ea.cmp(&zero),
                Ordering::Greater => return zero.cmp(eb),
                Ordering::Equal => match ea.cmp(eb) {
                    Ordering::Equal => {
                        i += 1;
                        j += 1;
                    }
                    other => return other,
                },
            },
        }
    }
}

/// `c**k` for integer `k`, charged against the numeric power budget.
pub fn rational_pow(
    c: &BigRational,
    k: &BigInt,
    budget: &mut Budget,
) -> Result<BigRational, BudgetExceeded> {
    if k.is_zero() || c.is_one() {
        return Ok(BigRational::one());
    }
    // 0**k for k < 0 is ruled out by callers.
    if c.is_zero() {
        return Ok(BigRational::zero());
    }
    let magnitude = k.abs();
    let bits = c.numer().bits().max(c.denom().bits());
    let estimate = u64::try_from(&magnitude)
        .unwrap_or(u64::MAX)
        .saturating_mul(bits);
    budget.charge(Operation::NumericPower, Metric::NumberBits, estimate)?;

    let n = usize::try_from(&magnitude).unwrap_or(usize::MAX);
    let numer = num_traits::pow(c.numer().clone(), n);
    let denom = num_traits::pow(c.denom().clone(), n);
    let value = BigRational::new(numer, denom);
    Ok(if k.is_negative() { value.recip() } else { value })
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Poly {
    terms: FxHashMap<Monomial, BigRational>,
}

impl Poly {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Self {
        Self::term(Monomial::new(), c)
    }

    pub fn term(mono: Monomial, coeff: BigRational) -> Self {
        let mut terms = FxHashMap::default();
        if !coeff.is_zero() {
            terms.insert(mono, coeff);
        }
        Self { terms }
    }

    pub fn atom(id: ExprId, exp: BigRational) -> Self {
        let mut mono = Monomial::new();
        if !exp.is_zero() {
            mono.push((id, exp));
        }
        Self::term(mono, BigRational::one())
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.as_constant().is_some_and(|c| c.is_one())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    pub fn into_terms(self) -> impl Iterator<Item = (Monomial, BigRational)> {
        self.terms.into_iter()
    }

    /// Constant value, when the polynomial has no atoms.
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.single_term() {
            Some((m, c)) if m.is_empty() => Some(c.clone()),
            _ if self.is_zero() => Some(BigRational::zero()),
            _ => None,
        }
    }

    pub fn single_term(&self) -> Option<(&Monomial, &BigRational)> {
        if self.terms.len() == 1 {
            self.terms.iter().next()
        } else {
            None
        }
    }

    /// Largest term under [`lex_cmp`].
    pub fn leading_term(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().max_by(|a, b| lex_cmp(a.0, b.0))
    }

    /// Smallest term under [`lex_cmp`].
    pub fn trailing_term(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().min_by(|a, b| lex_cmp(a.0, b.0))
    }

    pub fn add_term(&mut self, mono: Monomial, coeff: BigRational) {
        if coeff.is_zero() {
            return;
        }
        match self.terms.get_mut(&mono) {
            Some(existing) => {
                *existing += coeff;
                if existing.is_zero() {
                    self.terms.remove(&mono);
                }
            }
            None => {
                self.terms.insert(mono, coeff);
            }
        }
    }

    pub fn add(&self, other: &Poly) -> Poly {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), c.clone());
        }
        out
    }

    pub fn neg(&self) -> Poly {
        self.scale(&-BigRational::one())
    }

    pub fn sub(&self, other: &Poly) -> Poly {
        self.add(&other.neg())
    }

    pub fn scale(&self, k: &BigRational) -> Poly {
        if k.is_zero() {
            return Poly::zero();
        }
        Poly {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), c * k)).collect(),
        }
    }

    pub fn mul_monomial(&self, mono: &Monomial) -> Poly {
        if mono.is_empty() {
            return self.clone();
        }
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (mono_mul(m, mono), c.clone()))
                .collect(),
        }
    }

    pub fn mul(&self, other: &Poly, budget: &mut Budget) -> Result<Poly, BudgetExceeded> {
        if self.is_zero() || other.is_zero() {
            return Ok(Poly::zero());
        }
        budget.charge(
            Operation::Expand,
            Metric::TermsMaterialized,
            (self.len() * other.len()) as u64,
        )?;
        let mut out = Poly::zero();
        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                out.add_term(mono_mul(m1, m2), c1 * c2);
            }
        }
        Ok(out)
    }

    pub fn pow(&self, n: u32, budget: &mut Budget) -> Result<Poly, BudgetExceeded> {
        if n == 0 {
            return Ok(Poly::one());
        }
        if let Some((m, c)) = self.single_term() {
            let coeff = rational_pow(c, &BigInt::from(n), budget)?;
            return Ok(Poly::term(
                mono_scale(m, &BigRational::from_integer(n.into())),
                coeff,
            ));
        }
        let mut result = self.clone();
        for _ in 1..n {
            result = result.mul(self, budget)?;
        }
        Ok(result)
    }

    /// Positive rational content: gcd of numerators over lcm of denominators.
    pub fn content(&self) -> BigRational {
        let mut numer = BigInt::zero();
        let mut denom = BigInt::one();
        for c in self.terms.values() {
            numer = numer.gcd(c.numer());
            denom = denom.lcm(c.denom());
        }
        if numer.is_zero() {
            BigRational::zero()
        } else {
            BigRational::new(numer, denom)
        }
    }

    /// Per-atom minimum exponent over all terms, absent atoms counting as 0.
    /// Dividing by it leaves no negative exponents and no common atom factor.
    pub fn monomial_floor(&self) -> Monomial {
        let mut floor: FxHashMap<ExprId, BigRational> = FxHashMap::default();
        let mut seen_in: FxHashMap<ExprId, usize> = FxHashMap::default();
        for m in self.terms.keys() {
            for (a, e) in m {
                *seen_in.entry(*a).or_insert(0) += 1;
                floor
                    .entry(*a)
                    .and_modify(|cur| {
                        if e < cur {
                            *cur = e.clone();
                        }
                    })
                    .or_insert_with(|| e.clone());
            }
        }
        let n = self.terms.len();
        let mut out: Monomial = floor
            .into_iter()
            .filter_map(|(a, e)| {
                let present_everywhere = seen_in.get(&a).copied() == Some(n);
                let e = if present_everywhere {
                    e
                } else {
                    e.min(BigRational::zero())
                };
                (!e.is_zero()).then_some((a, e))
            })
            .collect();
        out.sort_by(|x, y| x.0.cmp(&y.0));
        out
    }

    /// Per-atom `(lowest, highest)` exponent over all terms, absent atoms
    /// counting as 0.
    fn exponent_bounds(&self) -> FxHashMap<ExprId, (BigRational, BigRational)> {
        let mut bounds: FxHashMap<ExprId, (BigRational, BigRational)> = FxHashMap::default();
        let mut seen_in: FxHashMap<ExprId, usize> = FxHashMap::default();
        for m in self.terms.keys() {
            for (a, e) in m {
                *seen_in.entry(*a).or_insert(0) += 1;
                let (lo, hi) = bounds
                    .entry(*a)
                    .or_insert_with(|| (e.clone(), e.clone()));
                if *e < *lo {
                    *lo = e.clone();
                }
                if *e > *hi {
                    *hi = e.clone();
                }
            }
        }
        let n = self.terms.len();
        for (a, (lo, hi)) in bounds.iter_mut() {
            if seen_in.get(a).copied() != Some(n) {
                *lo = lo.clone().min(BigRational::zero());
                *hi = hi.clone().max(BigRational::zero());
            }
        }
        bounds
    }

    /// Exact quotient `self / divisor`, or `None` when the division leaves
    /// a remainder.
    ///
    /// Lowest and highest degrees add under multiplication, so every term
    /// of an exact quotient has its exponent in `a` within
    /// `[lo(self) - lo(divisor), hi(self) - hi(divisor)]`. A quotient term
    /// outside that box proves a remainder. Each step is charged to
    /// `PolyOps`.
    pub fn div_exact(
        &self,
        divisor: &Poly,
        budget: &mut Budget,
    ) -> Result<Option<Poly>, BudgetExceeded> {
        if divisor.is_zero() {
            return Ok(None);
        }
        if self.is_zero() {
            return Ok(Some(Poly::zero()));
        }
        if let Some((m, c)) = divisor.single_term() {
            return Ok(Some(self.mul_monomial(&mono_inv(m)).scale(&c.recip())));
        }

        let zero_range = (BigRational::zero(), BigRational::zero());
        let own = self.exponent_bounds();
        let theirs = divisor.exponent_bounds();
        let mut window: Vec<(ExprId, BigRational, BigRational)> = Vec::new();
        for atom in own.keys().chain(theirs.keys()) {
            if window.iter().any(|(a, _, _)| a == atom) {
                continue;
            }
            let (s_lo, s_hi) = own.get(atom).unwrap_or(&zero_range);
            let (d_lo, d_hi) = theirs.get(atom).unwrap_or(&zero_range);
            let (lo, hi) = (s_lo - d_lo, s_hi - d_hi);
            if lo > hi {
                return Ok(None);
            }
            window.push((*atom, lo, hi));
        }

        let (Some((d_mono, d_coeff)), Some((s_low, _)), Some((d_low, _))) = (
            divisor.leading_term(),
            self.trailing_term(),
            divisor.trailing_term(),
        ) else {
            return Ok(None);
        };
        let d_inv = mono_inv(d_mono);
        // An exact quotient's smallest term is trailing(self) / trailing(divisor).
        let lowest = mono_mul(s_low, &mono_inv(d_low));
        let step_cost = divisor.len() as u64;
        let mut remainder = self.clone();
        let mut quotient = Poly::zero();

        loop {
            let Some((r_mono, r_coeff)) = remainder.leading_term() else {
                return Ok(Some(quotient));
            };
            let q_mono = mono_mul(r_mono, &d_inv);
            if lex_cmp(&q_mono, &lowest) == Ordering::Less || !in_window(&q_mono, &window) {
                return Ok(None);
            }
            budget.charge(Operation::PolyOps, Metric::PolyOps, step_cost)?;
            let q_coeff = r_coeff / d_coeff;

            for (dm, dc) in &divisor.terms {
                remainder.add_term(mono_mul(dm, &q_mono), -(dc * &q_coeff));
            }
            quotient.add_term(q_mono, q_coeff);
        }
    }
}

fn in_window(m: &Monomial, window: &[(ExprId, BigRational, BigRational)]) -> bool {
    let zero = BigRational::zero();
    window.iter().all(|(atom, lo, hi)| {
        let e = m
            .iter()
            .find(|(a, _)| a == atom)
            .map_or(&zero, |(_, e)| e);
        lo <= e && e <= hi
    })
}

/// Quotient of polynomials; a zero denominator means undefined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fraction {
    pub num: Poly,
    pub den: Poly,
}

impl Fraction {
    pub fn from_poly(num: Poly) -> Self {
        Self {
            num,
            den: Poly::one(),
        }
    }

    pub fn constant(c: BigRational) -> Self {
        Self::from_poly(Poly::constant(c))
    }

    pub fn integer(n: i64) -> Self {
        Self::constant(BigRational::from_integer(n.into()))
    }

    pub fn undefined() -> Self {
        Self {
            num: Poly::one(),
            den: Poly::zero(),
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.den.is_zero()
    }

    pub fn is_zero(&self) -> bool {
        !self.is_undefined() && self.num.is_zero()
    }

    /// Denominator is exactly 1.
    pub fn is_polynomial(&self) -> bool {
        self.den.is_one()
    }

    pub fn as_constant(&self) -> Option<BigRational> {
        if self.is_polynomial() {
            self.num.as_constant()
        } else {
            None
        }
    }

    /// Bring to canonical shape: a single-term denominator is absorbed into
    /// the numerator; otherwise the denominator loses its monomial factor
    /// and becomes monic, and exact division is attempted.
    pub fn normalize(mut self, budget: &mut Budget) -> Result<Self, BudgetExceeded> {
        if self.is_undefined() {
            return Ok(Self::undefined());
        }
        if self.num.is_zero() {
            return Ok(Self::from_poly(Poly::zero()));
        }
        if let Some((m, c)) = self.den.single_term() {
            let num = self.num.mul_monomial(&mono_inv(m)).scale(&c.recip());
            return Ok(Self::from_poly(num));
        }

        let floor = self.den.monomial_floor();
        if !floor.is_empty() {
            let inv = mono_inv(&floor);
            self.den = self.den.mul_monomial(&inv);
            self.num = self.num.mul_monomial(&inv);
        }
        if let Some(lc) = self.den.leading_term().map(|(_, c)| c.clone()) {
            if !lc.is_one() {
                let k = lc.recip();
                self.den = self.den.scale(&k);
                self.num = self.num.scale(&k);
            }
        }
        Ok(match self.num.div_exact(&self.den, budget)? {
            Some(q) => Self::from_poly(q),
            None => self,
        })
    }

    pub fn neg(&self) -> Self {
        if self.is_undefined() {
            return Self::undefined();
        }
        Self {
            num: self.num.neg(),
            den: self.den.clone(),
        }
    }

    pub fn add(&self, other: &Fraction, budget: &mut Budget) -> Result<Self, BudgetExceeded> {
        if self.is_undefined() || other.is_undefined() {
            return Ok(Self::undefined());
        }
        if self.den == other.den {
            return Ok(Self {
                num: self.num.add(&other.num),
                den: self.den.clone(),
            });
        }
        let left = self.num.mul(&other.den, budget)?;
        let right = other.num.mul(&self.den, budget)?;
        Ok(Self {
            num: left.add(&right),
            den: self.den.mul(&other.den, budget)?,
        })
    }

    pub fn sub(&self, other: &Fraction, budget: &mut Budget) -> Result<Self, BudgetExceeded> {
        self.add(&other.neg(), budget)
    }

    pub fn mul(&self, other: &Fraction, budget: &mut Budget) -> Result<Self, BudgetExceeded> {
        if self.is_undefined() || other.is_undefined() {
            return Ok(Self::undefined());
        }
        Ok(Self {
            num: self.num.mul(&other.num, budget)?,
            den: self.den.mul(&other.den, budget)?,
        })
    }

    /// `1/self`; the reciprocal of zero is undefined.
    pub fn recip(&self) -> Self {
        if self.is_undefined() || self.num.is_zero() {
            return Self::undefined();
        }
        Self {
            num: self.den.clone(),
            den: self.num.clone(),
        }
    }

    pub fn div(&self, other: &Fraction, budget: &mut Budget) -> Result<Self, BudgetExceeded> {
        self.mul(&other.recip(), budget)
    }

    pub fn pow_int(&self, k: &BigInt, budget: &mut Budget) -> Result<Self, BudgetExceeded> {
        if self.is_undefined() {
            return Ok(Self::undefined());
        }
        if k.is_zero() {
            return Ok(Self::integer(1));
        }
        let base = if k.is_negative() {
            self.recip()
        } else {
            self.clone()
        };
        if base.is_undefined() {
            return Ok(base);
        }
        let n = match u32::try_from(&k.abs()) {
            Ok(n) => n,
            Err(_) => {
                return Err(BudgetExceeded {
                    op: Operation::Expand,
                    metric: Metric::TermsMaterialized,
                    used: u64::MAX,
                    limit: budget.limit(Operation::Expand, Metric::TermsMaterialized),
                })
            }
        };
        Ok(Self {
            num: base.num.pow(n, budget)?,
            den: base.den.pow(n, budget)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_ast::Context;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    struct Vars {
        x: ExprId,
        y: ExprId,
    }

    fn vars() -> Vars {
        let mut ctx = Context::new();
        Vars {
            x: ctx.var("x"),
            y: ctx.var("y"),
        }
    }

    fn linear(v: ExprId, c: i64) -> Poly {
        Poly::atom(v, q(1, 1)).add(&Poly::constant(q(c, 1)))
    }

    #[test]
    fn test_like_terms_cancel() {
        let v = vars();
        let p = linear(v.x, 1);
        assert!(p.sub(&p).is_zero());
    }

    #[test]
    fn test_binomial_square() {
        let v = vars();
        let mut budget = Budget::new();
        let sq = linear(v.x, 1).pow(2, &mut budget).unwrap();
        assert_eq!(sq.len(), 3);
        let two_x = Poly::atom(v.x, q(1, 1)).scale(&q(2, 1));
        let expected = Poly::atom(v.x, q(2, 1)).add(&two_x).add(&Poly::one());
        assert_eq!(sq, expected);
    }

    #[test]
    fn test_rational_exponents_merge() {
        let v = vars();
        let mut budget = Budget::new();
        let root = Poly::atom(v.x, q(1, 2));
        let prod = root.mul(&root, &mut budget).unwrap();
        assert_eq!(prod, Poly::atom(v.x, q(1, 1)));
        let inv = Poly::atom(v.x, q(-1, 1));
        assert!(Poly::atom(v.x, q(1, 1))
            .mul(&inv, &mut budget)
            .unwrap()
            .is_one());
    }

    #[test]
    fn test_exact_division() {
        let v = vars();
        let mut budget = Budget::new();
        // (x^2 - 1) / (x - 1) = x + 1
        let num = Poly::atom(v.x, q(2, 1)).sub(&Poly::one());
        let den = linear(v.x, -1);
        assert_eq!(num.div_exact(&den, &mut budget).unwrap(), Some(linear(v.x, 1)));
        // (x + 1) / (x - 1) has a remainder
        assert_eq!(linear(v.x, 1).div_exact(&den, &mut budget).unwrap(), None);
        // multivariate: (x*y + x) / (y + 1) = x
        let xy = Poly::atom(v.x, q(1, 1))
            .mul(&linear(v.y, 1), &mut budget)
            .unwrap();
        assert_eq!(
            xy.div_exact(&linear(v.y, 1), &mut budget).unwrap(),
            Some(Poly::atom(v.x, q(1, 1)))
        );
    }

    #[test]
    fn test_division_by_other_atom_stops_at_once() {
        let v = vars();
        let mut budget = Budget::new();
        budget.set_limit(Operation::PolyOps, Metric::PolyOps, 10);
        // (x - 1) / (y + 3): no quotient term fits y's degree window
        let num = linear(v.x, -1);
        let den = linear(v.y, 3);
        assert_eq!(num.div_exact(&den, &mut budget).unwrap(), None);
        assert_eq!(budget.used(Operation::PolyOps, Metric::PolyOps), 0);
    }

    #[test]
    fn test_division_steps_are_charged() {
        let v = vars();
        let mut budget = Budget::new();
        budget.set_limit(Operation::PolyOps, Metric::PolyOps, 10);
        // (x^20 - 1) / (x - 1) needs 20 steps of 2 term products each
        let num = Poly::atom(v.x, q(20, 1)).sub(&Poly::one());
        let err = num.div_exact(&linear(v.x, -1), &mut budget).unwrap_err();
        assert_eq!(err.op, Operation::PolyOps);
        assert_eq!(err.metric, Metric::PolyOps);

        let mut unlimited = Budget::new();
        let quotient = num.div_exact(&linear(v.x, -1), &mut unlimited).unwrap();
        assert_eq!(quotient.map(|p| p.len()), Some(20));
    }

    #[test]
    fn test_fraction_difference_is_zero() {
        let v = vars();
        let mut budget = Budget::new();
        // 1/(x-1) - 1/(x-1)
        let f = Fraction::from_poly(Poly::one())
            .div(&Fraction::from_poly(linear(v.x, -1)), &mut budget)
            .unwrap();
        let d = f.sub(&f, &mut budget).unwrap().normalize(&mut budget).unwrap();
        assert!(d.is_zero());
    }

    #[test]
    fn test_undefined_is_absorbing() {
        let mut budget = Budget::new();
        let zero = Fraction::integer(0);
        let undefined = Fraction::integer(1).div(&zero, &mut budget).unwrap();
        assert!(undefined.is_undefined());
        let sum = undefined.add(&Fraction::integer(3), &mut budget).unwrap();
        assert!(sum.is_undefined());
        let prod = zero.mul(&undefined, &mut budget).unwrap();
        assert!(prod.is_undefined());
        assert!(undefined
            .pow_int(&BigInt::from(-1), &mut budget)
            .unwrap()
            .is_undefined());
    }

    #[test]
    fn test_normalize_absorbs_monomial_denominator() {
        let v = vars();
        let f = Fraction {
            num: linear(v.x, 1),
            den: Poly::atom(v.x, q(1, 1)).scale(&q(2, 1)),
        }
        .normalize(&mut Budget::new())
        .unwrap();
        assert!(f.is_polynomial());
        let expected = Poly::constant(q(1, 2)).add(&Poly::atom(v.x, q(-1, 1)).scale(&q(1, 2)));
        assert_eq!(f.num, expected);
    }

    #[test]
    fn test_budget_stops_expansion() {
        let v = vars();
        let mut budget = Budget::new();
        budget.set_limit(Operation::Expand, Metric::TermsMaterialized, 50);
        let p = linear(v.x, 1).add(&Poly::atom(v.y, q(1, 1)));
        assert!(p.pow(20, &mut budget).is_err());
    }

    #[test]
    fn test_lex_order_is_multiplicative() {
        let v = vars();
        let a: Monomial = smallvec::smallvec![(v.x, q(2, 1))];
        let b: Monomial = smallvec::smallvec![(v.x, q(1, 1)), (v.y, q(5, 1))];
        let c: Monomial = smallvec::smallvec![(v.y, q(-1, 2))];
        assert_eq!(lex_cmp(&a, &b), Ordering::Greater);
        assert_eq!(
            lex_cmp(&mono_mul(&a, &c), &mono_mul(&b, &c)),
            Ordering::Greater
        );
    }
}
