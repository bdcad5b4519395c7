//! Drive an XCS session against a benchmark problem

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use xcs_rl::{train, Environment, Multiplexer, Xcs, Xor};

use crate::population;
use crate::settings::{Problem, RunConfig, Settings};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Benchmark problem
    #[arg(short, long, value_enum)]
    pub problem: Option<Problem>,

    /// Multiplexer address bits
    #[arg(long)]
    pub address_bits: Option<usize>,

    /// Number of act/update cycles
    #[arg(short, long)]
    pub steps: Option<u64>,

    /// Engine seed
    #[arg(long)]
    pub seed: Option<u32>,

    /// Seed of the problem's input stream
    #[arg(long)]
    pub env_seed: Option<u64>,

    /// Population file to start from
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Population file to write when done
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Disable action-set and GA subsumption
    #[arg(long)]
    pub no_subsumption: bool,

    /// Log progress every K steps
    #[arg(long)]
    pub report_every: Option<u64>,
}

impl RunArgs {
    /// Command-line flags take precedence over the settings file
    fn apply(&self, settings: &mut Settings) -> Result<()> {
        let run = &mut settings.run;
        if let Some(problem) = self.problem {
            run.problem = problem;
        }
        if let Some(bits) = self.address_bits {
            run.address_bits = bits;
        }
        if let Some(steps) = self.steps {
            run.steps = steps;
        }
        if let Some(env_seed) = self.env_seed {
            run.env_seed = env_seed;
        }
        if let Some(every) = self.report_every {
            run.report_every = every;
        }
        if let Some(seed) = self.seed {
            settings.xcs.seed = Some(seed);
        }
        settings.run.validate()
    }
}

pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let mut settings = Settings::load(config_path)?;
    args.apply(&mut settings)?;

    let xcs = execute(&args, &settings)?;
    println!("{}", serde_json::to_string_pretty(&xcs.stats())?);
    Ok(())
}

fn environment(run: &RunConfig) -> Box<dyn Environment> {
    match run.problem {
        Problem::Xor => Box::new(Xor::new(run.env_seed)),
        Problem::Multiplexer => Box::new(Multiplexer::new(run.address_bits, run.env_seed)),
    }
}

/// Build the session, train it, and save it if asked
pub fn execute(args: &RunArgs, settings: &Settings) -> Result<Xcs> {
    let run = &settings.run;
    let mut env = environment(run);
    let mut xcs = Xcs::with_config(env.actions(), settings.xcs.clone())
        .context("Failed to create XCS session")?;
    if args.no_subsumption {
        xcs.subsumption_off();
    }

    if let Some(path) = &args.load {
        let classifiers = population::load(path)?;
        xcs.restore(classifiers)
            .with_context(|| format!("Population in {} does not fit {}", path.display(), env.name()))?;
    }

    info!(
        "Running {} for {} steps (N={}, seed {})",
        env.name(),
        run.steps,
        xcs.config().max_population,
        xcs.seed()
    );

    let every = run.report_every.max(1);
    let mut done = 0;
    while done < run.steps {
        let chunk = every.min(run.steps - done);
        let stats = train(&mut xcs, env.as_mut(), chunk)?;
        done += chunk;
        info!(
            "t={} performance={:.3} classifiers={} numerosity={} error={:.2}",
            stats.time,
            stats.internal_performance,
            stats.population_size,
            stats.numerosity,
            stats.mean_error
        );
    }

    if let Some(path) = &args.save {
        population::save(path, &xcs)?;
    }
    Ok(xcs)
}
