use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use drill_practice::{
    load_problem_bank, DrillConfig, MemoryStore, ProblemId, UserId, Verifier,
};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// JSON array of problems
    #[arg(long)]
    pub bank: PathBuf,

    /// Problem id within the bank
    #[arg(long)]
    pub problem: i64,

    /// User the attempt is recorded for
    #[arg(long, default_value_t = 1)]
    pub user: i64,

    /// Answer text
    pub answer: String,
}

/// Prints the verdict as JSON.
pub fn run(args: VerifyArgs, config: &DrillConfig) -> Result<()> {
    let text = fs::read_to_string(&args.bank)
        .with_context(|| format!("could not read {}", args.bank.display()))?;
    let bank = load_problem_bank(&text).context("invalid problem bank")?;

    let store = MemoryStore::new(config.schedule.clone());
    for problem in bank {
        store.add_problem(problem)?;
    }
    let verifier = Verifier::with_limits(store, config.engine.clone());
    let verdict = verifier.verify(ProblemId(args.problem), UserId(args.user), &args.answer)?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}
