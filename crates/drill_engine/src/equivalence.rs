//! Zero-difference equivalence test.

use drill_ast::{Context, Expr, ExprId};

use crate::assumptions::AssumptionSet;
use crate::error::EngineError;
use crate::options::EngineLimits;
use crate::simplify::simplify_to_fixed_point;

/// Decides `a == b` by simplifying `a - b` to a fixed point.
///
/// The test is one-sided: `true` is a proof of equality under the
/// assumptions, `false` only means no proof was found.
#[derive(Clone, Debug)]
pub struct Equivalence<'a> {
    assumptions: &'a AssumptionSet,
    limits: EngineLimits,
}

impl<'a> Equivalence<'a> {
    pub fn new(assumptions: &'a AssumptionSet, limits: EngineLimits) -> Self {
        Self {
            assumptions,
            limits,
        }
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// True iff `a - b` simplifies to exactly `0`.
    pub fn equal(&self, ctx: &mut Context, a: ExprId, b: ExprId) -> Result<bool, EngineError> {
        let diff = ctx.add(Expr::Sub(a, b));
        let residual = self.residual(ctx, diff)?;
        let equal = ctx.is_zero(residual);
        tracing::debug!(target: "simplify", equal, nodes = ctx.len(), "equivalence_checked");
        Ok(equal)
    }

    /// Fixed point of `expr`, the form `equal` inspects.
    pub fn residual(&self, ctx: &mut Context, expr: ExprId) -> Result<ExprId, EngineError> {
        simplify_to_fixed_point(ctx, expr, self.assumptions, &self.limits)
    }
}
