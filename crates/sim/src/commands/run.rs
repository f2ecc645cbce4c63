//! Play one encounter and print its report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use combat_content::ContentFactory;
use combat_runtime::{EncounterReport, EncounterRunner, RuntimeConfig};
use console::style;

use super::default_data_dir;

/// Play an encounter to its end
#[derive(Parser)]
pub struct Run {
    /// Encounter name (file stem under `encounters/`)
    #[arg(value_name = "ENCOUNTER")]
    encounter: String,

    /// Content directory (defaults to the bundled sample data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Seed of the damage roll generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Actor health and notification counts
    Summary,
    /// Full JSON report
    Json,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let data_dir = self.data_dir.unwrap_or_else(default_data_dir);
        let seed = self.seed.unwrap_or(RuntimeConfig::default().seed);
        let report = play(&data_dir, &self.encounter, seed)?;

        match self.format {
            OutputFormat::Summary => print_summary(&report),
            OutputFormat::Json => print_json(&report)?,
        }
        Ok(())
    }
}

/// Loads `encounter` from `data_dir` and plays it to its end.
pub fn play(data_dir: &Path, encounter: &str, seed: u64) -> Result<EncounterReport> {
    let bundle = ContentFactory::new(data_dir)
        .load_bundle(encounter)
        .with_context(|| {
            format!(
                "Failed to load encounter '{}' from {}",
                encounter,
                data_dir.display()
            )
        })?;

    let mut runner = EncounterRunner::new(bundle.config, bundle.profiles, bundle.encounter, seed)
        .context("Failed to set up encounter")?;
    let report = runner.run().context("Encounter aborted")?;

    tracing::info!(
        encounter = %report.name,
        ticks = report.ticks,
        notifications = report.notifications,
        "encounter finished"
    );
    Ok(report)
}

fn print_summary(report: &EncounterReport) {
    println!("{} {}", style("Encounter:").bold().cyan(), report.name);
    println!(
        "{} {:.2}s over {} ticks",
        style("Elapsed:").bold().cyan(),
        report.elapsed,
        report.ticks
    );
    println!();

    println!("{}", style("Actors:").bold().yellow());
    for actor in &report.actors {
        let state = if actor.dead {
            style("dead").red()
        } else {
            style("alive").green()
        };
        println!(
            "  {:<12} HP: {}/{} ({})",
            actor.name, actor.health, actor.max_health, state
        );
    }
    println!();

    println!(
        "{} {}",
        style("Notifications:").bold().yellow(),
        report.notifications
    );
    for (name, count) in &report.counts {
        println!("  {:<26} {}", name, count);
    }
}

fn print_json(report: &EncounterReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_duel_plays_to_completion() {
        let report = play(&default_data_dir(), "duel", 7).expect("sample duel should play");

        assert_eq!(report.name, "duel");
        assert!(report.elapsed >= 4.0);
        assert!(report.notifications > 0);
        let slime = report
            .actors
            .iter()
            .find(|actor| actor.name == "slime")
            .expect("slime is in the duel");
        assert!(slime.health < slime.max_health);
    }

    #[test]
    fn same_seed_same_report() {
        let first = play(&default_data_dir(), "duel", 99).unwrap();
        let second = play(&default_data_dir(), "duel", 99).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_encounter_names_the_file() {
        let err = play(&default_data_dir(), "nowhere", 1).unwrap_err();
        assert!(format!("{:#}", err).contains("nowhere"));
    }
}
