use crate::error::AstError;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;

/// Handle to a node stored in a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
    Infinity,
    Undefined,
}

impl Constant {
    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "E",
            Constant::Infinity => "oo",
            Constant::Undefined => "nan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Add(ExprId, ExprId),
    Sub(ExprId, ExprId),
    Mul(ExprId, ExprId),
    Div(ExprId, ExprId),
    Pow(ExprId, ExprId),
    Neg(ExprId),
    Function(String, Vec<ExprId>),
    /// Unevaluated derivative: `Derivative(expr, (x, 2), y)`.
    Derivative {
        expr: ExprId,
        wrt: Vec<(String, u32)>,
    },
    /// Unevaluated integral, indefinite when `bounds` is `None`.
    Integral {
        integrand: ExprId,
        var: String,
        bounds: Option<(ExprId, ExprId)>,
    },
}

impl Expr {
    /// True for the operators the parser keeps deferred in unevaluated mode.
    pub fn is_deferred_operator(&self) -> bool {
        matches!(self, Expr::Derivative { .. } | Expr::Integral { .. })
    }
}

/// Counters exposed for budget accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextStats {
    /// Distinct nodes allocated in the arena.
    pub nodes_created: u64,
    /// `add` calls answered from the interner.
    pub interner_hits: u64,
}

/// Arena of hash-consed expression nodes.
///
/// Every structurally identical node is stored exactly once, so two ids are
/// equal iff the expressions they denote have the same representation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    nodes: Vec<Expr>,
    interner: FxHashMap<Expr, ExprId>,
    stats: ContextStats,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a node. `Neg(Number(n))` folds to `Number(-n)`.
    pub fn add(&mut self, expr: Expr) -> ExprId {
        let expr = match expr {
            Expr::Neg(inner) => match self.get(inner) {
                Expr::Number(n) => Expr::Number(-n.clone()),
                _ => Expr::Neg(inner),
            },
            other => other,
        };

        if let Some(id) = self.interner.get(&expr) {
            self.stats.interner_hits += 1;
            return *id;
        }

        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr.clone());
        self.interner.insert(expr, id);
        self.stats.nodes_created += 1;
        id
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    pub fn stats(&self) -> ContextStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn num(&mut self, n: i64) -> ExprId {
        self.add(Expr::Number(BigRational::from_integer(BigInt::from(n))))
    }

    pub fn rational(&mut self, n: BigRational) -> ExprId {
        self.add(Expr::Number(n))
    }

    pub fn constant(&mut self, c: Constant) -> ExprId {
        self.add(Expr::Constant(c))
    }

    pub fn var(&mut self, name: &str) -> ExprId {
        self.add(Expr::Variable(name.to_string()))
    }

    /// Like [`Context::var`], but rejects names that are not identifiers.
    pub fn try_var(&mut self, name: &str) -> Result<ExprId, AstError> {
        if !is_identifier(name) {
            return Err(AstError::InvalidSymbol(name.to_string()));
        }
        Ok(self.var(name))
    }

    pub fn call(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        self.add(Expr::Function(name.to_string(), args))
    }

    pub fn is_number(&self, id: ExprId) -> bool {
        matches!(self.get(id), Expr::Number(_))
    }

    pub fn as_number(&self, id: ExprId) -> Option<&BigRational> {
        match self.get(id) {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_zero(&self, id: ExprId) -> bool {
        self.as_number(id).is_some_and(|n| n.is_zero())
    }

    pub fn is_one(&self, id: ExprId) -> bool {
        self.as_number(id).is_some_and(|n| n.is_one())
    }

    /// Does `id` mention the variable `name` anywhere (bound integration
    /// variables of definite integrals excluded)?
    pub fn contains_var(&self, id: ExprId, name: &str) -> bool {
        match self.get(id) {
            Expr::Variable(v) => v == name,
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => self.contains_var(*l, name) || self.contains_var(*r, name),
            Expr::Neg(e) => self.contains_var(*e, name),
            Expr::Function(_, args) => args.iter().any(|a| self.contains_var(*a, name)),
            Expr::Derivative { expr, .. } => self.contains_var(*expr, name),
            Expr::Integral {
                integrand,
                var,
                bounds,
            } => match bounds {
                Some((lo, hi)) => {
                    self.contains_var(*lo, name)
                        || self.contains_var(*hi, name)
                        || (var != name && self.contains_var(*integrand, name))
                }
                None => self.contains_var(*integrand, name),
            },
        }
    }

    /// Collect the free variable names of `id`, sorted and deduplicated.
    pub fn free_vars(&self, id: ExprId) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(id, &mut out);
        out.sort();
        out.dedup();
        out
    }

    fn collect_vars(&self, id: ExprId, out: &mut Vec<String>) {
        match self.get(id) {
            Expr::Variable(v) => out.push(v.clone()),
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => {
                self.collect_vars(*l, out);
                self.collect_vars(*r, out);
            }
            Expr::Neg(e) => self.collect_vars(*e, out),
            Expr::Function(_, args) => {
                for a in args {
                    self.collect_vars(*a, out);
                }
            }
            Expr::Derivative { expr, .. } => self.collect_vars(*expr, out),
            Expr::Integral {
                integrand,
                var,
                bounds,
            } => {
                let mut inner = Vec::new();
                self.collect_vars(*integrand, &mut inner);
                if let Some((lo, hi)) = bounds {
                    inner.retain(|v| v != var);
                    self.collect_vars(*lo, out);
                    self.collect_vars(*hi, out);
                }
                out.extend(inner);
            }
        }
    }

    /// Node count of the tree rooted at `id`, shared subtrees counted once per use.
    pub fn tree_size(&self, id: ExprId) -> usize {
        1 + match self.get(id) {
            Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => 0,
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => self.tree_size(*l) + self.tree_size(*r),
            Expr::Neg(e) => self.tree_size(*e),
            Expr::Function(_, args) => args.iter().map(|a| self.tree_size(*a)).sum(),
            Expr::Derivative { expr, .. } => self.tree_size(*expr),
            Expr::Integral {
                integrand, bounds, ..
            } => {
                self.tree_size(*integrand)
                    + bounds.map_or(0, |(lo, hi)| self.tree_size(lo) + self.tree_size(hi))
            }
        }
    }
}

/// Letter or underscore, then letters, digits or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
