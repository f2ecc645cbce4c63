//! Scripted encounter player.
//!
//! Loads combat content from a data directory and plays encounters headless.
//! Run with: `cargo run -p combat-sim -- run duel`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Run};

/// Plays scripted combat encounters
#[derive(Parser)]
#[command(name = "combat-sim")]
#[command(about = "Headless combat encounter player", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play an encounter to its end and print the report
    Run(Run),

    /// Validate a data directory and list its content
    Check(Check),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Check(cmd) => cmd.execute(),
    }
}
