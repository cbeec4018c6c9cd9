//! Sign and realness facts derived from declared assumptions.
//!
//! Works structurally on simplified trees. Answers are conservative:
//! `Sign::Unknown` and `false` mean "not provable", never "false".

use drill_ast::{Constant, Context, Expr, ExprId};
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::assumptions::AssumptionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Nonnegative,
    Zero,
    Nonpositive,
    Negative,
    Unknown,
}

impl Sign {
    pub fn is_nonnegative(self) -> bool {
        matches!(self, Sign::Positive | Sign::Nonnegative | Sign::Zero)
    }

    pub fn is_nonpositive(self) -> bool {
        matches!(self, Sign::Negative | Sign::Nonpositive | Sign::Zero)
    }

    pub fn is_positive(self) -> bool {
        self == Sign::Positive
    }

    pub fn is_nonzero(self) -> bool {
        matches!(self, Sign::Positive | Sign::Negative)
    }

    fn negate(self) -> Sign {
        match self {
            Sign::Positive => Sign::Negative,
            Sign::Nonnegative => Sign::Nonpositive,
            Sign::Zero => Sign::Zero,
            Sign::Nonpositive => Sign::Nonnegative,
            Sign::Negative => Sign::Positive,
            Sign::Unknown => Sign::Unknown,
        }
    }

    fn add(self, other: Sign) -> Sign {
        use Sign::*;
        match (self, other) {
            (Zero, s) | (s, Zero) => s,
            (Positive, Positive | Nonnegative) | (Nonnegative, Positive) => Positive,
            (Nonnegative, Nonnegative) => Nonnegative,
            (Negative, Negative | Nonpositive) | (Nonpositive, Negative) => Negative,
            (Nonpositive, Nonpositive) => Nonpositive,
            _ => Unknown,
        }
    }

    fn mul(self, other: Sign) -> Sign {
        use Sign::*;
        match (self, other) {
            (Zero, _) | (_, Zero) => Zero,
            (Unknown, _) | (_, Unknown) => Unknown,
            (Positive, s) => s,
            (s, Positive) => s,
            (Negative, s) => s.negate(),
            (s, Negative) => s.negate(),
            (Nonnegative, Nonnegative) | (Nonpositive, Nonpositive) => Nonnegative,
            _ => Nonpositive,
        }
    }
}

pub struct SignOracle<'a> {
    ctx: &'a Context,
    assumptions: &'a AssumptionSet,
}

impl<'a> SignOracle<'a> {
    pub fn new(ctx: &'a Context, assumptions: &'a AssumptionSet) -> Self {
        Self { ctx, assumptions }
    }

    pub fn sign(&self, id: ExprId) -> Sign {
        match self.ctx.get(id) {
            Expr::Number(n) => {
                if n.is_zero() {
                    Sign::Zero
                } else if n.is_positive() {
                    Sign::Positive
                } else {
                    Sign::Negative
                }
            }
            Expr::Constant(Constant::Pi | Constant::E) => Sign::Positive,
            Expr::Constant(_) => Sign::Unknown,
            Expr::Variable(name) => match self.assumptions.get(name) {
                Some(a) if a.zero => Sign::Zero,
                Some(a) if a.positive => Sign::Positive,
                Some(a) if a.negative => Sign::Negative,
                Some(a) if a.nonnegative => Sign::Nonnegative,
                Some(a) if a.nonpositive => Sign::Nonpositive,
                _ => Sign::Unknown,
            },
            Expr::Neg(e) => self.sign(*e).negate(),
            Expr::Add(l, r) => self.sign(*l).add(self.sign(*r)),
            Expr::Sub(l, r) => self.sign(*l).add(self.sign(*r).negate()),
            Expr::Mul(l, r) => self.sign(*l).mul(self.sign(*r)),
            Expr::Div(l, r) => match self.sign(*r) {
                Sign::Positive | Sign::Negative => self.sign(*l).mul(self.sign(*r)),
                _ => Sign::Unknown,
            },
            Expr::Pow(base, exp) => self.pow_sign(*base, *exp),
            Expr::Function(name, args) => match (name.as_str(), args.as_slice()) {
                ("exp", [u]) if self.is_real(*u) => Sign::Positive,
                ("Abs", [u]) => {
                    if self.sign(*u).is_nonzero() {
                        Sign::Positive
                    } else {
                        Sign::Nonnegative
                    }
                }
                ("cosh", [u]) if self.is_real(*u) => Sign::Positive,
                ("sqrt", [u]) if self.sign(*u).is_nonnegative() => Sign::Nonnegative,
                _ => Sign::Unknown,
            },
            Expr::Derivative { .. } | Expr::Integral { .. } => Sign::Unknown,
        }
    }

    fn pow_sign(&self, base: ExprId, exp: ExprId) -> Sign {
        let base_sign = self.sign(base);
        if base_sign.is_positive() && self.is_real(exp) {
            return Sign::Positive;
        }
        let Some(e) = self.ctx.as_number(exp) else {
            return Sign::Unknown;
        };
        if e.is_integer() {
            let k = e.to_integer();
            if k.is_zero() {
                return Sign::Positive;
            }
            if k.is_even() && self.is_real(base) {
                return if base_sign.is_nonzero() {
                    Sign::Positive
                } else {
                    Sign::Nonnegative
                };
            }
            if k.is_odd() {
                return match base_sign {
                    // 1/0 is not a sign
                    Sign::Nonnegative | Sign::Nonpositive | Sign::Zero if k.is_negative() => {
                        Sign::Unknown
                    }
                    s => s,
                };
            }
            return Sign::Unknown;
        }
        if base_sign.is_nonnegative() && e.is_positive() {
            return if base_sign.is_positive() {
                Sign::Positive
            } else {
                Sign::Nonnegative
            };
        }
        Sign::Unknown
    }

    pub fn is_real(&self, id: ExprId) -> bool {
        match self.ctx.get(id) {
            Expr::Number(_) => true,
            Expr::Constant(c) => matches!(c, Constant::Pi | Constant::E),
            Expr::Variable(name) => self.assumptions.is_real(name),
            Expr::Neg(e) => self.is_real(*e),
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) => {
                self.is_real(*l) && self.is_real(*r)
            }
            Expr::Div(l, r) => self.is_real(*l) && self.is_real(*r) && self.sign(*r).is_nonzero(),
            Expr::Pow(base, exp) => {
                if !self.is_real(*base) || !self.is_real(*exp) {
                    return false;
                }
                if self.sign(*base).is_positive() {
                    return true;
                }
                match self.ctx.as_number(*exp) {
                    Some(e) if e.is_integer() => !e.is_negative() || self.sign(*base).is_nonzero(),
                    Some(e) => e.is_positive() && self.sign(*base).is_nonnegative(),
                    None => false,
                }
            }
            Expr::Function(name, args) => match (name.as_str(), args.as_slice()) {
                ("Abs", [_]) => true,
                ("sin" | "cos" | "atan" | "exp" | "sinh" | "cosh" | "tanh", [u]) => {
                    self.is_real(*u)
                }
                ("log", [u]) => self.sign(*u).is_positive(),
                ("sqrt", [u]) => self.sign(*u).is_nonnegative(),
                _ => false,
            },
            Expr::Derivative { .. } | Expr::Integral { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::SymbolAssumptions;
    use drill_parser::parse;

    fn positive_x() -> AssumptionSet {
        let mut set = AssumptionSet::new();
        set.insert(
            "x",
            SymbolAssumptions {
                positive: true,
                ..Default::default()
            },
        );
        set.insert(
            "r",
            SymbolAssumptions {
                real: true,
                ..Default::default()
            },
        );
        set
    }

    fn sign_of(input: &str) -> Sign {
        let mut ctx = Context::new();
        let e = parse(input, &mut ctx).unwrap();
        let set = positive_x();
        SignOracle::new(&ctx, &set).sign(e)
    }

    #[test]
    fn test_declared_signs_propagate() {
        assert_eq!(sign_of("x"), Sign::Positive);
        assert_eq!(sign_of("-x"), Sign::Negative);
        assert_eq!(sign_of("2*x + 1"), Sign::Positive);
        assert_eq!(sign_of("x**(1/2)"), Sign::Positive);
        assert_eq!(sign_of("x - 1"), Sign::Unknown);
    }

    #[test]
    fn test_even_powers_of_reals() {
        assert_eq!(sign_of("r**2"), Sign::Nonnegative);
        assert_eq!(sign_of("r**2 + 1"), Sign::Positive);
        assert_eq!(sign_of("y**2"), Sign::Unknown);
    }

    #[test]
    fn test_functions() {
        assert_eq!(sign_of("exp(r)"), Sign::Positive);
        assert_eq!(sign_of("Abs(y)"), Sign::Nonnegative);
        assert_eq!(sign_of("exp(y)"), Sign::Unknown);
    }
}
