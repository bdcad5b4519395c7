//! Configuration loading for the XCS CLI

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use xcs_core::XcsConfig;

/// Settings document: engine tunables plus driver defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub xcs: XcsConfig,
    pub run: RunConfig,
}

/// Benchmark problem driven by `xcs run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Problem {
    Xor,
    Multiplexer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub problem: Problem,
    pub steps: u64,
    /// Address bits of the multiplexer
    pub address_bits: usize,
    /// Seed of the environment's input stream
    pub env_seed: u64,
    pub report_every: u64,
}

/// Multiplexer sizes `xcs run` accepts, from the 3-bit to the 70-bit problem
pub const ADDRESS_BITS: RangeInclusive<usize> = 1..=6;

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if !ADDRESS_BITS.contains(&self.address_bits) {
            anyhow::bail!(
                "address_bits must be within {}..={}, got {}",
                ADDRESS_BITS.start(),
                ADDRESS_BITS.end(),
                self.address_bits
            );
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            problem: Problem::Xor,
            steps: 10_000,
            address_bits: 2,
            env_seed: 1,
            report_every: 1000,
        }
    }
}

impl Settings {
    /// Load from `path`, or the first config file found, then overlay `XCS_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path.is_some();
        let config_path = path.map(Path::to_path_buf).or_else(Self::find_config_file);

        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = &config_path {
            tracing::info!("Loading config from: {:?}", path);
            builder = builder.add_source(File::from(path.clone()).required(explicit));
        } else {
            tracing::debug!("No config file found, using defaults");
        }

        builder = builder.add_source(
            Environment::with_prefix("XCS")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        settings.xcs.validate().context("Invalid xcs configuration")?;
        settings.run.validate().context("Invalid run configuration")?;
        Ok(settings)
    }

    /// Render as a TOML document
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Find the configuration file
    pub fn find_config_file() -> Option<PathBuf> {
        // Check in order: ./xcs.toml, ~/.config/xcs/xcs.toml
        let local = PathBuf::from("xcs.toml");
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".config").join("xcs").join("xcs.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.xcs, XcsConfig::default());
        assert_eq!(settings.run.problem, Problem::Xor);
        assert_eq!(settings.run.address_bits, 2);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut settings = Settings::default();
        settings.xcs.max_population = 400;
        settings.xcs.seed = Some(77);
        settings.run.problem = Problem::Multiplexer;

        let text = settings.to_toml().unwrap();
        assert!(text.contains("[xcs]"));
        assert!(text.contains("problem = \"multiplexer\""));

        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.xcs, settings.xcs);
        assert_eq!(back.run.problem, Problem::Multiplexer);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[xcs]\nmax_population = 250\nseed = 9\n\n[run]\nsteps = 42").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.xcs.max_population, 250);
        assert_eq!(settings.xcs.seed, Some(9));
        assert_eq!(settings.xcs.beta, 0.15);
        assert_eq!(settings.run.steps, 42);
        assert_eq!(settings.run.report_every, 1000);
    }

    #[test]
    fn test_missing_explicit_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[xcs]\nepsilon = 1.5").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_address_bits_out_of_range() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[run]\naddress_bits = 64").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());

        let mut run = RunConfig::default();
        run.address_bits = 0;
        assert!(run.validate().is_err());
        run.address_bits = 6;
        assert!(run.validate().is_ok());
    }
}
