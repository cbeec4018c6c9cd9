use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "drill", version, about = "Check math drill answers without the web layer")]
struct Cli {
    /// Configuration file with [engine] and [schedule] tables
    #[arg(long, global = true, default_value = "drill.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simplify an expression to its canonical form
    Simplify(commands::simplify::SimplifyArgs),
    /// Decide whether two expressions are equivalent
    Check(commands::check::CheckArgs),
    /// Verify an answer against a problem from a JSON bank
    Verify(commands::verify::VerifyArgs),
    /// Parse every problem of a JSON bank and report broken entries
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = drill_practice::DrillConfig::load(&cli.config);
    tracing::debug!(path = %cli.config.display(), "config_loaded");
    match cli.command {
        Command::Simplify(args) => commands::simplify::run(args, &config),
        Command::Check(args) => commands::check::run(args, &config),
        Command::Verify(args) => commands::verify::run(args, &config),
        Command::Validate(args) => commands::validate::run(args, &config),
    }
}
