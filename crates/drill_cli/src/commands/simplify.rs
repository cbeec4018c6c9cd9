use anyhow::{Context as _, Result};
use clap::Args;
use drill_ast::{Context, DisplayExpr};
use drill_engine::{parse_expression, simplify_to_fixed_point, ParseMode};
use drill_practice::DrillConfig;

use super::{assumption_set, parse_assumption};

#[derive(Args, Debug)]
pub struct SimplifyArgs {
    /// Expression in answer syntax
    pub expr: String,

    /// Symbol assumption, e.g. --assume "x=x > 0"
    #[arg(long = "assume", value_parser = parse_assumption)]
    pub assumptions: Vec<(String, String)>,

    /// Keep Derivative/Integral nodes instead of evaluating them
    #[arg(long, default_value_t = false)]
    pub unevaluated: bool,
}

pub fn run(args: SimplifyArgs, config: &DrillConfig) -> Result<()> {
    let mut ctx = Context::new();
    let set = assumption_set(&args.assumptions, &mut ctx)?;
    let mode = if args.unevaluated {
        ParseMode::Unevaluated
    } else {
        ParseMode::Evaluated
    };
    let expr = parse_expression(&args.expr, &set, mode, &mut ctx)
        .with_context(|| format!("could not parse '{}'", args.expr))?;
    let result = simplify_to_fixed_point(&mut ctx, expr, &set, &config.engine)?;
    println!("{}", DisplayExpr::new(&ctx, result));
    Ok(())
}
