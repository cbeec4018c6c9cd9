//! Answer-checking scenarios end to end: declarations, parse modes and the
//! zero-difference test.

use std::collections::BTreeMap;

use drill_ast::Context;
use drill_engine::{
    parse_expression, resolve_assumptions, AssumptionSet, EngineError, EngineLimits, Equivalence,
    ParseMode,
};

fn declarations(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn equivalent(expected: &str, answer: &str, pairs: &[(&str, &str)]) -> bool {
    let mut ctx = Context::new();
    let set = resolve_assumptions(&declarations(pairs), &mut ctx).unwrap();
    let a = parse_expression(expected, &set, ParseMode::Evaluated, &mut ctx).unwrap();
    let b = parse_expression(answer, &set, ParseMode::Evaluated, &mut ctx).unwrap();
    Equivalence::new(&set, EngineLimits::default())
        .equal(&mut ctx, a, b)
        .unwrap()
}

#[test]
fn test_algebraic_answers() {
    assert!(equivalent("x**2", "x*x", &[]));
    assert!(equivalent("x**2 - 4", "(x - 2)*(x + 2)", &[]));
    assert!(equivalent("2x + 3(x + 1)", "5*x + 3", &[]));
    assert!(equivalent("x^3", "x**3", &[]));
    assert!(!equivalent("x + 1", "x + 2", &[]));
}

#[test]
fn test_derivative_answers() {
    assert!(equivalent("Derivative(x**2, x)", "2*x", &[]));
    assert!(equivalent("Derivative(sin(x), x)", "cos(x)", &[]));
    assert!(equivalent("Derivative(x**3, x, 2)", "6*x", &[]));
    assert!(equivalent("diff(exp(2*x), x)", "2*exp(2*x)", &[]));
    assert!(!equivalent("Derivative(x**2, x)", "x**2", &[]));
}

#[test]
fn test_integral_answers() {
    assert!(equivalent("Integral(2*x, (x, 0, 1))", "1", &[]));
    assert!(equivalent("Integral(sin(x), (x, 0, pi))", "2", &[]));
    // antiderivatives differ by a constant, so only the defaults match
    assert!(equivalent("Integral(3*x**2, x)", "x**3", &[]));
}

#[test]
fn test_assumption_dependent_answers() {
    assert!(equivalent("sqrt(x**2)", "x", &[("x", "x > 0")]));
    assert!(!equivalent("sqrt(x**2)", "x", &[]));
    assert!(equivalent(
        "log(a*b)",
        "log(a) + log(b)",
        &[("a", "Q.positive(a)"), ("b", "Symbol('b', positive=True)")]
    ));
    assert!(equivalent("Abs(n)", "-n", &[("n", "n < 0")]));
}

#[test]
fn test_declared_e_is_a_symbol() {
    assert!(!equivalent("log(E)", "1", &[("E", "E > 0")]));
    assert!(equivalent("log(E)", "1", &[]));
}

#[test]
fn test_fixed_point_cap_is_reported() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    let mut ctx = Context::new();
    let set = AssumptionSet::new();
    let limits = EngineLimits {
        max_fixed_point_passes: 1,
        ..EngineLimits::default()
    };
    let a = parse_expression("(x + 1)**2", &set, ParseMode::Evaluated, &mut ctx).unwrap();
    let b = parse_expression("x**2", &set, ParseMode::Evaluated, &mut ctx).unwrap();
    let err = Equivalence::new(&set, limits).equal(&mut ctx, a, b);
    assert!(matches!(err, Err(EngineError::FixedPointNotReached { passes: 1 })));
}

#[test]
fn test_expansion_budget_is_reported() {
    let mut ctx = Context::new();
    let set = AssumptionSet::new();
    let a = parse_expression("(a + b + c + d)**30", &set, ParseMode::Evaluated, &mut ctx).unwrap();
    let b = parse_expression("0", &set, ParseMode::Evaluated, &mut ctx).unwrap();
    let err = Equivalence::new(&set, EngineLimits::strict()).equal(&mut ctx, a, b);
    assert!(matches!(err, Err(EngineError::Budget(_))));
}

#[test]
fn test_rational_answers_stay_within_division_budget() {
    let limits = EngineLimits {
        max_poly_ops: 200,
        ..EngineLimits::default()
    };
    let mut ctx = Context::new();
    let set = AssumptionSet::new();
    let parse = |text: &str, ctx: &mut Context| {
        parse_expression(text, &set, ParseMode::Evaluated, ctx).unwrap()
    };
    let equivalence = Equivalence::new(&set, limits);

    let a = parse("(x - 1)/(y + 3)", &mut ctx);
    let b = parse("x/(y + 3) - 1/(y + 3)", &mut ctx);
    assert!(equivalence.equal(&mut ctx, a, b).unwrap());

    let c = parse("x/(y + 3)", &mut ctx);
    assert!(!equivalence.equal(&mut ctx, a, c).unwrap());

    let d = parse("cos((x - pi)/(y + 3))", &mut ctx);
    assert!(equivalence.equal(&mut ctx, d, d).unwrap());
}
