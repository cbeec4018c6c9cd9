//! Symbol assumptions declared by a problem.
//!
//! Each problem carries a map `symbol -> predicate text`. The resolver parses
//! every predicate and folds it into per-symbol flags closed under the usual
//! implications (`positive` implies `nonnegative`, `nonzero` and `real`,
//! `integer` implies `rational` and `real`, ...).

use std::collections::BTreeMap;

use drill_ast::{Constant, Context, Expr, ExprId, RelOp};
use drill_parser::{parse_predicate, ParseError, Predicate};
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

/// Known facts about one symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolAssumptions {
    pub real: bool,
    pub positive: bool,
    pub negative: bool,
    pub nonnegative: bool,
    pub nonpositive: bool,
    pub nonzero: bool,
    pub zero: bool,
    pub integer: bool,
    pub rational: bool,
    pub even: bool,
    pub odd: bool,
    pub prime: bool,
    pub finite: bool,
}

impl SymbolAssumptions {
    /// Set a named flag. Returns false for names the resolver does not track.
    fn set(&mut self, flag: &str) -> bool {
        match flag {
            "real" => self.real = true,
            "positive" => self.positive = true,
            "negative" => self.negative = true,
            "nonnegative" => self.nonnegative = true,
            "nonpositive" => self.nonpositive = true,
            "nonzero" => self.nonzero = true,
            "zero" => self.zero = true,
            "integer" => self.integer = true,
            "rational" => self.rational = true,
            "even" => self.even = true,
            "odd" => self.odd = true,
            "prime" => self.prime = true,
            "finite" => self.finite = true,
            // commutative and complex hold for every symbol already
            "commutative" | "complex" => {}
            _ => return false,
        }
        true
    }

    /// Apply implications until nothing changes.
    pub fn close(&mut self) {
        loop {
            let before = *self;
            if self.prime {
                self.integer = true;
                self.positive = true;
            }
            if self.even || self.odd {
                self.integer = true;
            }
            if self.odd {
                self.nonzero = true;
            }
            if self.zero {
                self.nonnegative = true;
                self.nonpositive = true;
                self.integer = true;
                self.even = true;
            }
            if self.integer {
                self.rational = true;
            }
            if self.positive {
                self.nonnegative = true;
                self.nonzero = true;
            }
            if self.negative {
                self.nonpositive = true;
                self.nonzero = true;
            }
            if self.nonnegative && self.nonzero {
                self.positive = true;
            }
            if self.nonpositive && self.nonzero {
                self.negative = true;
            }
            if self.nonnegative && self.nonpositive {
                self.zero = true;
            }
            if self.rational || self.nonnegative || self.nonpositive {
                self.real = true;
            }
            if self.real {
                self.finite = true;
            }
            if *self == before {
                break;
            }
        }
    }

    fn contradiction(&self) -> Option<&'static str> {
        if self.positive && self.nonpositive {
            Some("positive and nonpositive")
        } else if self.negative && self.nonnegative {
            Some("negative and nonnegative")
        } else if self.zero && self.nonzero {
            Some("zero and nonzero")
        } else if self.even && self.odd {
            Some("even and odd")
        } else {
            None
        }
    }
}

/// Resolved assumptions for every declared symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssumptionSet {
    symbols: BTreeMap<String, SymbolAssumptions>,
}

impl AssumptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Was `name` declared (with or without flags)?
    pub fn declares(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SymbolAssumptions> {
        self.symbols.get(name)
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&str, &SymbolAssumptions)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert flags for `name` directly, closing them under implication.
    pub fn insert(&mut self, name: impl Into<String>, mut flags: SymbolAssumptions) {
        flags.close();
        self.symbols.insert(name.into(), flags);
    }

    pub fn is_real(&self, name: &str) -> bool {
        self.get(name).is_some_and(|a| a.real)
    }

    pub fn is_positive(&self, name: &str) -> bool {
        self.get(name).is_some_and(|a| a.positive)
    }

    pub fn is_integer(&self, name: &str) -> bool {
        self.get(name).is_some_and(|a| a.integer)
    }

    fn entry(&mut self, name: &str) -> &mut SymbolAssumptions {
        self.symbols.entry(name.to_string()).or_default()
    }
}

/// Build the assumption set for one problem.
///
/// Keys must be identifiers. A relation between a symbol and a numeric
/// constant sets sign flags; any other inequality only marks the symbols it
/// mentions as real.
pub fn resolve_assumptions(
    declarations: &BTreeMap<String, String>,
    ctx: &mut Context,
) -> Result<AssumptionSet, ParseError> {
    let mut set = AssumptionSet::new();
    let declared = |name: &str| declarations.contains_key(name);

    for (symbol, text) in declarations {
        ctx.try_var(symbol)?;
        set.entry(symbol);

        for predicate in parse_predicate(text, ctx, declared)? {
            match predicate {
                Predicate::Flags { symbol: target, flags } => {
                    let target = target.unwrap_or_else(|| symbol.clone());
                    let entry = set.entry(&target);
                    for (flag, on) in flags {
                        // Negative facts (`positive=False`) carry no rewrite power.
                        if on && !entry.set(&flag) {
                            return Err(ParseError::InvalidAssumption(format!(
                                "unsupported flag '{}'",
                                flag
                            )));
                        }
                    }
                }
                Predicate::Relation { lhs, op, rhs } => apply_relation(&mut set, ctx, lhs, op, rhs),
            }
        }
    }

    for (name, flags) in set.symbols.iter_mut() {
        flags.close();
        if let Some(reason) = flags.contradiction() {
            return Err(ParseError::InvalidAssumption(format!(
                "'{}' is declared {}",
                name, reason
            )));
        }
    }

    tracing::debug!(
        target: "verify",
        symbols = set.symbols.len(),
        "assumptions_resolved"
    );
    Ok(set)
}

fn apply_relation(set: &mut AssumptionSet, ctx: &Context, lhs: ExprId, op: RelOp, rhs: ExprId) {
    let oriented = match (ctx.get(lhs), ctx.get(rhs)) {
        (Expr::Variable(v), _) => constant_sign(ctx, rhs).map(|s| (v.clone(), op, s)),
        (_, Expr::Variable(v)) => constant_sign(ctx, lhs).map(|s| (v.clone(), op.mirrored(), s)),
        _ => None,
    };

    let Some((name, op, bound)) = oriented else {
        if !matches!(op, RelOp::Eq | RelOp::Neq) {
            for name in ctx.free_vars(lhs).into_iter().chain(ctx.free_vars(rhs)) {
                set.entry(&name).real = true;
            }
        }
        return;
    };

    let entry = set.entry(&name);
    if op != RelOp::Neq {
        entry.real = true;
    }
    match (op, bound) {
        (RelOp::Gt, Ordering::Greater | Ordering::Equal) => entry.positive = true,
        (RelOp::Geq, Ordering::Greater) => entry.positive = true,
        (RelOp::Geq, Ordering::Equal) => entry.nonnegative = true,
        (RelOp::Lt, Ordering::Less | Ordering::Equal) => entry.negative = true,
        (RelOp::Leq, Ordering::Less) => entry.negative = true,
        (RelOp::Leq, Ordering::Equal) => entry.nonpositive = true,
        (RelOp::Neq, Ordering::Equal) => entry.nonzero = true,
        (RelOp::Eq, Ordering::Equal) => entry.zero = true,
        (RelOp::Eq, Ordering::Greater) => entry.positive = true,
        (RelOp::Eq, Ordering::Less) => entry.negative = true,
        _ => {}
    }
}

/// Sign of a numeric constant operand, compared with zero.
fn constant_sign(ctx: &Context, id: ExprId) -> Option<Ordering> {
    match ctx.get(id) {
        Expr::Number(n) => Some(if n.is_zero() {
            Ordering::Equal
        } else if n.is_positive() {
            Ordering::Greater
        } else {
            Ordering::Less
        }),
        Expr::Constant(Constant::Pi | Constant::E) => Some(Ordering::Greater),
        Expr::Neg(inner) => constant_sign(ctx, *inner).map(Ordering::reverse),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(pairs: &[(&str, &str)]) -> Result<AssumptionSet, ParseError> {
        let decls: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        resolve_assumptions(&decls, &mut Context::new())
    }

    #[test]
    fn test_empty_declarations() {
        let set = resolve(&[]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_strict_lower_bound_implies_positive() {
        let set = resolve(&[("x", "x > 0")]).unwrap();
        let x = set.get("x").unwrap();
        assert!(x.positive && x.nonnegative && x.nonzero && x.real);
        assert!(!x.integer);
    }

    #[test]
    fn test_mirrored_relation() {
        let set = resolve(&[("t", "0 <= t")]).unwrap();
        let t = set.get("t").unwrap();
        assert!(t.nonnegative && t.real);
        assert!(!t.positive);
    }

    #[test]
    fn test_upper_bounds() {
        let set = resolve(&[("a", "a < 0"), ("b", "b <= -2"), ("c", "c < 5")]).unwrap();
        assert!(set.get("a").unwrap().negative);
        assert!(set.get("b").unwrap().negative);
        let c = set.get("c").unwrap();
        assert!(c.real && !c.negative);
    }

    #[test]
    fn test_nonzero_relation_does_not_imply_real() {
        let set = resolve(&[("n", "n != 0")]).unwrap();
        let n = set.get("n").unwrap();
        assert!(n.nonzero);
        assert!(!n.real);
    }

    #[test]
    fn test_symbol_constructor_flags_close() {
        let set = resolve(&[("n", "Symbol('n', positive=True, integer=True)")]).unwrap();
        let n = set.get("n").unwrap();
        assert!(n.positive && n.integer && n.rational && n.real);
    }

    #[test]
    fn test_bare_flag_applies_to_key() {
        let set = resolve(&[("k", "prime")]).unwrap();
        let k = set.get("k").unwrap();
        assert!(k.prime && k.integer && k.positive);
    }

    #[test]
    fn test_conjunction() {
        let set = resolve(&[("x", "x >= 0 & x != 0")]).unwrap();
        assert!(set.is_positive("x"));
    }

    #[test]
    fn test_other_relations_only_mark_real() {
        let set = resolve(&[("x", "x**2 > y")]).unwrap();
        assert!(set.is_real("x"));
        assert!(set.is_real("y"));
        assert!(!set.is_positive("x"));
    }

    #[test]
    fn test_declared_key_shadows_constant() {
        let set = resolve(&[("E", "E > 0")]).unwrap();
        assert!(set.is_positive("E"));
    }

    #[test]
    fn test_invalid_declarations() {
        assert!(resolve(&[("x", "x >")]).is_err());
        assert!(resolve(&[("x", "Q.sparkly(x)")]).is_err());
        assert!(resolve(&[("2x", "positive")]).is_err());
        assert!(resolve(&[("x", "x > 0 & x < 0")]).is_err());
    }
}
