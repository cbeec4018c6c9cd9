//! Parsing under an assumption set.

use drill_ast::{Context, ExprId};
use drill_parser::{parse_with_symbols, ParseError};
use serde::{Deserialize, Serialize};

use crate::assumptions::AssumptionSet;
use crate::calculus::doit;

/// Whether deferred calculus operators are applied after parsing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Apply every `Derivative`/`Integral` that has a symbolic result.
    #[default]
    Evaluated,
    /// Keep calculus operators as written.
    Unevaluated,
}

/// Parse `text`, treating every symbol declared in `assumptions` as a plain
/// symbol (a declared `E` is not Euler's number).
///
/// The same text in the same mode always yields the same id within one
/// context.
pub fn parse_expression(
    text: &str,
    assumptions: &AssumptionSet,
    mode: ParseMode,
    ctx: &mut Context,
) -> Result<ExprId, ParseError> {
    let parsed = parse_with_symbols(text, ctx, |name| assumptions.declares(name))?;
    Ok(match mode {
        ParseMode::Unevaluated => parsed,
        ParseMode::Evaluated => doit(ctx, parsed, assumptions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::SymbolAssumptions;
    use drill_ast::{Constant, DisplayExpr, Expr};

    #[test]
    fn test_unevaluated_keeps_derivative() {
        let mut ctx = Context::new();
        let set = AssumptionSet::new();
        let e = parse_expression("Derivative(x**2, x)", &set, ParseMode::Unevaluated, &mut ctx).unwrap();
        assert!(matches!(ctx.get(e), Expr::Derivative { .. }));
    }

    #[test]
    fn test_evaluated_applies_derivative() {
        let mut ctx = Context::new();
        let set = AssumptionSet::new();
        let e = parse_expression("Derivative(x**2, x)", &set, ParseMode::Evaluated, &mut ctx).unwrap();
        assert!(!matches!(ctx.get(e), Expr::Derivative { .. }));
        assert!(!DisplayExpr::new(&ctx, e).to_string().contains("Derivative"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let mut ctx = Context::new();
        let set = AssumptionSet::new();
        let a = parse_expression("x**2 + 3*x", &set, ParseMode::Evaluated, &mut ctx).unwrap();
        let b = parse_expression("x**2 + 3*x", &set, ParseMode::Evaluated, &mut ctx).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_declared_symbol_shadows_constant() {
        let mut ctx = Context::new();
        let mut set = AssumptionSet::new();
        let e = parse_expression("E", &set, ParseMode::Evaluated, &mut ctx).unwrap();
        assert!(matches!(ctx.get(e), Expr::Constant(Constant::E)));

        set.insert("E", SymbolAssumptions::default());
        let e = parse_expression("E", &set, ParseMode::Evaluated, &mut ctx).unwrap();
        assert!(matches!(ctx.get(e), Expr::Variable(name) if name == "E"));
    }

    #[test]
    fn test_malformed_text_is_rejected() {
        let mut ctx = Context::new();
        let set = AssumptionSet::new();
        assert!(parse_expression("2 +* x", &set, ParseMode::Evaluated, &mut ctx).is_err());
        assert!(parse_expression("(x + 1", &set, ParseMode::Evaluated, &mut ctx).is_err());
    }
}
