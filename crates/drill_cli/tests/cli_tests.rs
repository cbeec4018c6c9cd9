//! CLI contract tests: simplify, check, verify and validate.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("drill").unwrap()
}

const BANK: &str = r#"[
    {"id": 1, "canonical": "(x + 1)**2", "solutions": ["x**2 + 2*x + 1"],
     "display_solution": "x^2 + 2x + 1"},
    {"id": 2, "canonical": "Derivative(sin(x), x)", "expression_type": "derivative",
     "display_solution": "\\cos x"},
    {"id": 3, "canonical": "sqrt(x**2)", "assumptions": {"x": "x > 0"},
     "display_solution": "x"},
    {"id": 4, "canonical": "(a + b + c + d)**30", "display_solution": "..."}
]"#;

fn bank_dir(text: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bank.json"), text).unwrap();
    dir
}

#[test]
fn test_help_lists_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("simplify"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_simplify_prints_canonical_form() {
    cli().args(["simplify", "x*x - x**2"]).assert().success().stdout("0\n");
    cli()
        .args(["simplify", "sin(x)**2 + cos(x)**2"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_simplify_respects_assumptions() {
    cli()
        .args(["simplify", "sqrt(x**2) - x", "--assume", "x=x > 0"])
        .assert()
        .success()
        .stdout("0\n");
    cli()
        .args(["simplify", "sqrt(x**2) - x", "--assume", "x=x > 0 & Q.integer(x)"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_simplify_unevaluated_keeps_derivative() {
    cli()
        .args(["simplify", "--unevaluated", "Derivative(x**2, x)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Derivative"));
    cli()
        .args(["simplify", "Derivative(x**2, x)"])
        .assert()
        .success()
        .stdout("2*x\n");
}

#[test]
fn test_malformed_input_fails() {
    cli()
        .args(["simplify", "2 +* x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse"));
    cli()
        .args(["simplify", "x", "--assume", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=PREDICATE"));
}

#[test]
fn test_check_reports_equivalence() {
    cli()
        .args(["check", "(x + 1)**2", "x**2 + 2*x + 1"])
        .assert()
        .success()
        .stdout("equal\n");
    cli()
        .args(["check", "(x + 1)**2", "x**2 + 1"])
        .assert()
        .success()
        .stdout("not equal\n");
    cli()
        .args(["check", "log(a*b)", "log(a) + log(b)", "--assume", "a=a > 0", "--assume", "b=b > 0"])
        .assert()
        .success()
        .stdout("equal\n");
}

#[test]
fn test_verify_prints_verdict_json() {
    let dir = bank_dir(BANK);
    let bank = dir.path().join("bank.json");

    let output = cli()
        .args(["verify", "--problem", "2", "--bank"])
        .arg(&bank)
        .arg("cos(x)")
        .output()
        .unwrap();
    assert!(output.status.success());
    let verdict: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(verdict["correct"], Value::Bool(true));
    assert_eq!(verdict["display_solution"], "\\cos x");

    let output = cli()
        .args(["verify", "--problem", "1", "--user", "3", "--bank"])
        .arg(&bank)
        .arg("x**2 + 1")
        .output()
        .unwrap();
    assert!(output.status.success());
    let verdict: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(verdict["correct"], Value::Bool(false));
}

#[test]
fn test_verify_errors() {
    let dir = bank_dir(BANK);
    let bank = dir.path().join("bank.json");

    cli()
        .args(["verify", "--problem", "1", "--bank"])
        .arg(&bank)
        .arg("(x + 1)**2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("matches problem symbolically"));
    cli()
        .args(["verify", "--problem", "99", "--bank"])
        .arg(&bank)
        .arg("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("id 99 does not exist"));
    cli()
        .args(["verify", "--problem", "1", "--bank"])
        .arg(dir.path().join("missing.json"))
        .arg("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read"));
}

#[test]
fn test_config_limits_apply() {
    let dir = bank_dir(BANK);
    let bank = dir.path().join("bank.json");
    let config = dir.path().join("drill.toml");
    fs::write(&config, "[engine]\nmax_expand_terms = 200\n").unwrap();

    cli()
        .args(["verify", "--problem", "4", "--bank"])
        .arg(&bank)
        .arg("--config")
        .arg(&config)
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("too complex"));

    // a missing file means default limits
    cli()
        .args(["verify", "--problem", "3", "--bank"])
        .arg(&bank)
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("x")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"correct\": true"));
}

#[test]
fn test_validate_reports_broken_problems() {
    let good = bank_dir(BANK);
    cli()
        .arg("validate")
        .arg(good.path().join("bank.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("4 problems ok"));

    let broken = bank_dir(
        r#"[
            {"id": 1, "canonical": "x +* 1"},
            {"id": 2, "canonical": "x", "solutions": ["x", "(x"]},
            {"id": 3, "canonical": "x", "assumptions": {"x": "x > 0 & x < 0"}},
            {"id": 4, "canonical": "x"}
        ]"#,
    );
    cli()
        .arg("validate")
        .arg(broken.path().join("bank.json"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("problem 1"))
        .stdout(predicate::str::contains("problem 2"))
        .stdout(predicate::str::contains("solution 2"))
        .stdout(predicate::str::contains("problem 3"))
        .stdout(predicate::str::contains("problem 4").not())
        .stderr(predicate::str::contains("3 of 4 problems are invalid"));
}
