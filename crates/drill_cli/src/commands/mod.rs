//! Subcommand handlers.

pub mod check;
pub mod simplify;
pub mod validate;
pub mod verify;

use std::collections::BTreeMap;

use anyhow::{Context as _, Result};
use drill_ast::Context;
use drill_engine::{resolve_assumptions, AssumptionSet};

/// `name=predicate`, as given to `--assume`.
pub fn parse_assumption(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((name, predicate)) if !name.trim().is_empty() && !predicate.trim().is_empty() => {
            Ok((name.trim().to_string(), predicate.trim().to_string()))
        }
        _ => Err(format!("expected NAME=PREDICATE, got '{}'", text)),
    }
}

pub fn assumption_set(pairs: &[(String, String)], ctx: &mut Context) -> Result<AssumptionSet> {
    let declarations: BTreeMap<String, String> = pairs.iter().cloned().collect();
    resolve_assumptions(&declarations, ctx).context("invalid --assume declaration")
}
