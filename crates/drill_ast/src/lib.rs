//! Expression AST for the math drill engine.
//!
//! Expressions live in a [`Context`] arena and are addressed by [`ExprId`].
//! Nodes are hash-consed: adding a structurally identical node twice yields
//! the same id, so `ExprId` equality is representation equality.

pub mod display;
pub mod error;
pub mod expression;
pub mod ordering;

pub use display::DisplayExpr;
pub use error::AstError;
pub use expression::{is_identifier, Constant, Context, ContextStats, Expr, ExprId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,  // ==
    Neq, // !=
    Lt,  // <
    Gt,  // >
    Leq, // <=
    Geq, // >=
}

impl RelOp {
    /// The operator obtained by swapping the operands: `a < b` is `b > a`.
    pub fn mirrored(self) -> RelOp {
        match self {
            RelOp::Eq => RelOp::Eq,
            RelOp::Neq => RelOp::Neq,
            RelOp::Lt => RelOp::Gt,
            RelOp::Gt => RelOp::Lt,
            RelOp::Leq => RelOp::Geq,
            RelOp::Geq => RelOp::Leq,
        }
    }
}

impl std::fmt::Display for RelOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelOp::Eq => write!(f, "=="),
            RelOp::Neq => write!(f, "!="),
            RelOp::Lt => write!(f, "<"),
            RelOp::Gt => write!(f, ">"),
            RelOp::Leq => write!(f, "<="),
            RelOp::Geq => write!(f, ">="),
        }
    }
}
