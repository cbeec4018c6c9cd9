//! Symbolic equivalence engine for answer checking.
//!
//! - [`assumptions`]: predicate declarations to per-symbol flags
//! - [`normalize`]: parsing under an assumption set, evaluated or not
//! - [`simplify`]: canonical simplification, bounded by a [`Budget`]
//! - [`equivalence`]: the zero-difference test
//! - [`calculus`]: deferred derivatives and integrals

pub mod assumptions;
pub mod budget;
pub mod build;
pub mod calculus;
pub mod equivalence;
pub mod error;
pub mod normalize;
pub mod options;
pub mod poly;
pub mod sign;
pub mod simplify;

pub use assumptions::{resolve_assumptions, AssumptionSet, SymbolAssumptions};
pub use budget::{Budget, BudgetExceeded, Metric, Operation};
pub use calculus::{differentiate, doit, integrate, substitute};
pub use equivalence::Equivalence;
pub use error::EngineError;
pub use normalize::{parse_expression, ParseMode};
pub use options::EngineLimits;
pub use sign::{Sign, SignOracle};
pub use simplify::{simplify_once, simplify_to_fixed_point};
