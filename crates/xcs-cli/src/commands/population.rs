//! Population file commands

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::population::{self, Summary};

#[derive(Subcommand)]
pub enum PopulationCommands {
    /// Summarize a saved population
    Show {
        /// Population file
        file: PathBuf,
        /// Number of general accurate rules to list
        #[arg(short, long, default_value_t = 10)]
        top: usize,
        /// Error below which a rule counts as accurate
        #[arg(long, default_value_t = 10.0)]
        error_threshold: f64,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check every record of a population file
    Validate {
        /// Population file
        file: PathBuf,
    },
}

pub fn run(cmd: PopulationCommands) -> Result<()> {
    match cmd {
        PopulationCommands::Show {
            file,
            top,
            error_threshold,
            json,
        } => show(&file, top, error_threshold, json),
        PopulationCommands::Validate { file } => validate(&file),
    }
}

fn show(file: &std::path::Path, top: usize, error_threshold: f64, json: bool) -> Result<()> {
    let classifiers = population::load(file)?;
    let summary = Summary::of(&classifiers);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Population: {}", file.display());
    println!("====================\n");
    println!("Classifiers:      {}", summary.classifiers);
    println!("Numerosity:       {}", summary.numerosity);
    println!("Mean error:       {:.3}", summary.mean_error);
    println!("Mean fitness:     {:.3}", summary.mean_fitness);
    println!("Mean generality:  {:.3}", summary.mean_generality);

    let general = population::most_general_accurate(&classifiers, error_threshold, top);
    if general.is_empty() {
        println!("\nNo accurate classifiers (error < {error_threshold})");
    } else {
        println!("\nMost general accurate classifiers:");
        for cl in general {
            println!(
                "  {} -> {}  prediction {:.1}  error {:.2}  n={}",
                cl.condition_string(),
                cl.action,
                cl.prediction,
                cl.error,
                cl.numerosity
            );
        }
    }
    Ok(())
}

fn validate(file: &std::path::Path) -> Result<()> {
    let classifiers = population::load(file)?;
    let lengths: std::collections::BTreeSet<usize> =
        classifiers.iter().map(|cl| cl.condition.len()).collect();
    if lengths.len() > 1 {
        anyhow::bail!("Mixed condition lengths in {}: {:?}", file.display(), lengths);
    }
    println!("{}: {} valid records", file.display(), classifiers.len());
    Ok(())
}
