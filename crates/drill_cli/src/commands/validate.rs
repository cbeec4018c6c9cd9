use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::Args;
use drill_ast::Context;
use drill_engine::{parse_expression, ParseMode};
use drill_practice::{load_problem_bank, problem_assumptions, DrillConfig, Problem};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON array of problems
    pub bank: PathBuf,
}

pub fn run(args: ValidateArgs, _config: &DrillConfig) -> Result<()> {
    let text = fs::read_to_string(&args.bank)
        .with_context(|| format!("could not read {}", args.bank.display()))?;
    let bank = load_problem_bank(&text).context("invalid problem bank")?;

    let mut broken = 0;
    for problem in &bank {
        if let Err(e) = check_problem(problem) {
            broken += 1;
            println!("problem {}: {:#}", problem.id, e);
        }
    }
    if broken > 0 {
        bail!("{} of {} problems are invalid", broken, bank.len());
    }
    println!("{} problems ok", bank.len());
    Ok(())
}

fn check_problem(problem: &Problem) -> Result<()> {
    let mut ctx = Context::new();
    let set = problem_assumptions(problem, &mut ctx)?;
    parse_expression(&problem.canonical, &set, ParseMode::Unevaluated, &mut ctx)
        .context("canonical statement")?;
    for (index, solution) in problem.solutions.iter().enumerate() {
        parse_expression(solution, &set, ParseMode::Evaluated, &mut ctx)
            .with_context(|| format!("solution {}", index + 1))?;
    }
    Ok(())
}
