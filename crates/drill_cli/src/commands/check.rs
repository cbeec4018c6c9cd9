use anyhow::{Context as _, Result};
use clap::Args;
use drill_ast::Context;
use drill_engine::{parse_expression, Equivalence, ParseMode};
use drill_practice::DrillConfig;

use super::{assumption_set, parse_assumption};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Expected expression
    pub expected: String,

    /// Expression to compare against it
    pub answer: String,

    /// Symbol assumption, e.g. --assume "x=x > 0"
    #[arg(long = "assume", value_parser = parse_assumption)]
    pub assumptions: Vec<(String, String)>,
}

/// Prints `equal` or `not equal`; both exit successfully.
pub fn run(args: CheckArgs, config: &DrillConfig) -> Result<()> {
    let mut ctx = Context::new();
    let set = assumption_set(&args.assumptions, &mut ctx)?;
    let a = parse_expression(&args.expected, &set, ParseMode::Evaluated, &mut ctx)
        .with_context(|| format!("could not parse '{}'", args.expected))?;
    let b = parse_expression(&args.answer, &set, ParseMode::Evaluated, &mut ctx)
        .with_context(|| format!("could not parse '{}'", args.answer))?;
    let equal = Equivalence::new(&set, config.engine.clone()).equal(&mut ctx, a, b)?;
    println!("{}", if equal { "equal" } else { "not equal" });
    Ok(())
}
