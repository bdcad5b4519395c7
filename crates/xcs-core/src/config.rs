//! Tunable parameters of an XCS session

use serde::{Deserialize, Serialize};

use crate::error::{Result, XcsError};

/// XCS tunables. Field names follow the usual XCS literature; the comments give the classic symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XcsConfig {
    /// Learning rate (beta)
    pub beta: f64,
    /// Discount factor (gamma). Kept for multi-step payoff; single-step learning does not read it.
    pub gamma: f64,
    /// Accuracy fall-off multiplier (alpha)
    pub alpha: f64,
    /// Error below which a classifier counts as accurate (epsilon_0)
    pub error_threshold: f64,
    /// Accuracy power (nu)
    pub nu: f64,
    /// Exploration probability
    pub epsilon: f64,
    /// Population cap in micro-classifiers (N)
    pub max_population: u64,
    /// Mutation probability (mu)
    pub mutation_rate: f64,
    /// Crossover probability (chi)
    pub crossover_rate: f64,
    /// Under-fitness fraction of the mean that triggers the deletion penalty (delta)
    pub sigma: f64,
    /// Probability of a wildcard at each position when covering
    pub p_hash: f64,
    /// GA application threshold on mean time since last GA
    pub theta_ga: u64,
    /// Experience above which the deletion penalty may apply
    pub theta_del: u64,
    /// Experience above which a classifier may subsume
    pub theta_sub: u64,
    /// Distinct actions required in a match set before covering stops. Defaults to the action count.
    pub theta_act: Option<usize>,
    /// Generator seed. Drawn at random when absent.
    pub seed: Option<u32>,
}

impl Default for XcsConfig {
    fn default() -> Self {
        Self {
            beta: 0.15,
            gamma: 0.71,
            alpha: 0.1,
            error_threshold: 10.0,
            nu: 5.0,
            epsilon: 0.5,
            max_population: 1000,
            mutation_rate: 0.03,
            crossover_rate: 0.6,
            sigma: 0.1,
            p_hash: 0.33,
            theta_ga: 30,
            theta_del: 20,
            theta_sub: 20,
            theta_act: None,
            seed: None,
        }
    }
}

impl XcsConfig {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_population(mut self, max_population: u64) -> Self {
        self.max_population = max_population;
        self
    }

    /// Reject parameter values the update rules cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.beta > 0.0 && self.beta <= 1.0) {
            return Err(XcsError::Config(format!(
                "beta must be in (0, 1], got {}",
                self.beta
            )));
        }
        if self.error_threshold <= 0.0 {
            return Err(XcsError::Config(format!(
                "error_threshold must be positive, got {}",
                self.error_threshold
            )));
        }
        if self.max_population == 0 {
            return Err(XcsError::Config(
                "max_population must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("gamma", self.gamma),
            ("alpha", self.alpha),
            ("epsilon", self.epsilon),
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
            ("sigma", self.sigma),
            ("p_hash", self.p_hash),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(XcsError::Config(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.theta_act == Some(0) {
            return Err(XcsError::Config("theta_act must be at least 1".to_string()));
        }
        Ok(())
    }
}
