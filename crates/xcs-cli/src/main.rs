//! XCS CLI - Command line interface for the XCS engine
//!
//! Runs the engine against benchmark problems, persists populations, and
//! manages the settings file.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_precision_loss)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod population;
mod settings;

use commands::{config, population as population_cmd, run};

#[derive(Parser)]
#[command(name = "xcs")]
#[command(author, version, about = "XCS - accuracy-based learning classifier system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to ./xcs.toml, then ~/.config/xcs/xcs.toml)
    #[arg(short, long, global = true, env = "XCS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a session on a benchmark problem
    Run(run::RunArgs),

    /// Inspect population files
    #[command(subcommand)]
    Population(population_cmd::PopulationCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("xcs={log_level},xcs_rl={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => run::run(args, config_path),
        Commands::Population(cmd) => population_cmd::run(cmd),
        Commands::Config(cmd) => config::run(cmd, config_path),
    }
}
