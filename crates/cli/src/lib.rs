pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "catalog",
    about = "Catalog operator CLI",
    long_about = "Inspect catalog configuration, run readiness checks, and preview the demo catalog.",
    after_help = "Examples:\n  catalog doctor --json\n  catalog config\n  catalog seed"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Load the demo catalog into a fresh store and print per-category metrics")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, demo catalog integrity, and the images directory")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Seed => commands::seed::run(),
        Command::Config => commands::CommandResult::plain(commands::config::run()),
        Command::Doctor { json } => commands::CommandResult::plain(commands::doctor::run(json)),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
