//! Configuration management commands

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::settings::Settings;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(cmd: ConfigCommands, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(config_path),
        ConfigCommands::Init { force } => init(Path::new("xcs.toml"), force),
    }
}

fn show(config_path: Option<&Path>) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    match config_path.map(Path::to_path_buf).or_else(Settings::find_config_file) {
        Some(path) => println!("Config file: {}\n", path.display()),
        None => println!("No configuration file found. Using defaults.\n"),
    }

    let settings = Settings::load(config_path)?;
    println!("{}", settings.to_toml()?);
    Ok(())
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Configuration file already exists: {}", path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Settings::default().to_toml()?;
    std::fs::write(path, config)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created configuration file: {}", path.display());
    Ok(())
}
