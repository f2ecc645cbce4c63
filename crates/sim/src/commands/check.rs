//! Validate a data directory.
//!
//! Loads the tunables, the profile catalog and every encounter, so broken
//! references surface before a run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use combat_content::ContentFactory;
use console::style;

use super::default_data_dir;

/// Validate a data directory
#[derive(Parser)]
pub struct Check {
    /// Content directory (defaults to the bundled sample data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

/// What a successful check found.
#[derive(Debug, Default, PartialEq)]
pub struct CheckSummary {
    pub projectiles: Vec<String>,
    pub beams: Vec<String>,
    pub stuns: Vec<String>,
    pub weaknesses: Vec<String>,
    pub encounters: Vec<String>,
}

impl Check {
    pub fn execute(self) -> Result<()> {
        let data_dir = self.data_dir.unwrap_or_else(default_data_dir);
        let summary = check(&data_dir)?;

        println!("{} {}", style("Data:").bold().cyan(), data_dir.display());
        print_names("Projectiles", &summary.projectiles);
        print_names("Beams", &summary.beams);
        print_names("Stuns", &summary.stuns);
        print_names("Weaknesses", &summary.weaknesses);
        print_names("Encounters", &summary.encounters);
        println!("{}", style("All content is valid").bold().green());
        Ok(())
    }
}

pub fn check(data_dir: &Path) -> Result<CheckSummary> {
    let factory = ContentFactory::new(data_dir);
    factory.load_config()?;
    let profiles = factory.load_profiles()?;

    let mut encounters = Vec::new();
    let dir = data_dir.join("encounters");
    if dir.is_dir() {
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("Failed to read encounter directory: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron")
                && let Some(name) = path.file_stem().and_then(|stem| stem.to_str())
            {
                factory.load_encounter(name, &profiles)?;
                encounters.push(name.to_string());
            }
        }
    }

    Ok(CheckSummary {
        projectiles: sorted(profiles.projectiles.keys()),
        beams: sorted(profiles.beams.keys()),
        stuns: sorted(profiles.stuns.keys()),
        weaknesses: sorted(profiles.weaknesses.keys()),
        encounters: sorted(encounters.iter()),
    })
}

fn sorted<'a>(names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut names: Vec<String> = names.cloned().collect();
    names.sort();
    names
}

fn print_names(label: &str, names: &[String]) {
    println!("{} {}", style(format!("{}:", label)).bold().yellow(), names.len());
    for name in names {
        println!("  {}", name);
    }
}
