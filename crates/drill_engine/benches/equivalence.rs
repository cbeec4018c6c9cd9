use criterion::{criterion_group, criterion_main, Criterion};
use drill_ast::Context;
use drill_engine::{parse_expression, AssumptionSet, EngineLimits, Equivalence, ParseMode};
use std::hint::black_box;

fn check(expected: &str, answer: &str) -> bool {
    let mut ctx = Context::new();
    let set = AssumptionSet::new();
    let a = parse_expression(expected, &set, ParseMode::Evaluated, &mut ctx).unwrap();
    let b = parse_expression(answer, &set, ParseMode::Evaluated, &mut ctx).unwrap();
    Equivalence::new(&set, EngineLimits::default())
        .equal(&mut ctx, a, b)
        .unwrap()
}

fn benchmark_polynomial(c: &mut Criterion) {
    let mut group = c.benchmark_group("polynomial");

    group.bench_function("binomial_cube", |b| {
        b.iter(|| black_box(check("(x + y)**3", "x**3 + 3*x**2*y + 3*x*y**2 + y**3")))
    });

    group.bench_function("rational_partial_fractions", |b| {
        b.iter(|| black_box(check("1/(x - 1) - 1/(x + 1)", "2/(x**2 - 1)")))
    });

    group.finish();
}

fn benchmark_trig(c: &mut Criterion) {
    let mut group = c.benchmark_group("trigonometry");

    group.sample_size(20);
    group.bench_function("triple_angle", |b| {
        b.iter(|| black_box(check("sin(3*x)", "3*sin(x) - 4*sin(x)**3")))
    });

    group.finish();
}

fn benchmark_calculus(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculus");

    group.bench_function("derivative_product", |b| {
        b.iter(|| black_box(check("Derivative(x**2*sin(x), x)", "2*x*sin(x) + x**2*cos(x)")))
    });

    group.finish();
}

criterion_group!(benches, benchmark_polynomial, benchmark_trig, benchmark_calculus);
criterion_main!(benches);
