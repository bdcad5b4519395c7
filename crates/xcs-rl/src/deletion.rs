//! Eviction policy - roulette-wheel culling when the population is full

use tracing::{debug, trace};
use xcs_core::{Classifier, MinStdRand, XcsConfig};

use crate::population::{ClassifierId, Population};

/// A micro-classifier removed by one eviction draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    pub id: ClassifierId,
    /// The macro-classifier left the population because its numerosity reached 0
    pub removed: bool,
}

/// Deletion vote: action-set size times numerosity, inflated for experienced under-fit rules.
/// Never negative.
pub fn deletion_vote(classifier: &Classifier, mean_fitness: f64, config: &XcsConfig) -> f64 {
    let mut vote = classifier.action_set_size * classifier.numerosity as f64;
    let micro_fitness = classifier.micro_fitness();
    if classifier.experience > config.theta_del
        && micro_fitness > 0.0
        && micro_fitness < config.sigma * mean_fitness
    {
        vote *= mean_fitness / micro_fitness;
    }
    // NaN also maps to 0
    vote.max(0.0)
}

/// Remove one micro-classifier when total numerosity is at or above the cap.
///
/// Returns `None` when under the cap or when no classifier carries a positive vote.
pub fn delete_from_population(
    population: &mut Population,
    config: &XcsConfig,
    rng: &mut MinStdRand,
) -> Option<Eviction> {
    let numerosity = population.numerosity();
    if numerosity < config.max_population || numerosity == 0 {
        return None;
    }

    let fitness_sum: f64 = population.iter().map(|(_, cl)| cl.fitness).sum();
    let mean_fitness = fitness_sum / numerosity as f64;

    let votes: Vec<(ClassifierId, f64)> = population
        .iter()
        .map(|(id, cl)| (id, deletion_vote(cl, mean_fitness, config)))
        .collect();
    let vote_sum: f64 = votes.iter().map(|(_, v)| v).sum();
    if vote_sum.is_nan() || vote_sum <= 0.0 {
        trace!("No positive deletion votes, skipping eviction");
        return None;
    }

    let spin = rng.next_f64() * vote_sum;
    let mut cumulative = 0.0;
    let victim = votes
        .iter()
        .find(|(_, vote)| {
            cumulative += vote;
            cumulative > spin
        })
        .or_else(|| votes.last())
        .map(|&(id, _)| id)?;

    let removed = population.decrement(victim).is_some();
    debug!("Evicted one copy of {} (removed: {})", victim, removed);
    Some(Eviction { id: victim, removed })
}

/// Evict until total numerosity no longer exceeds the cap
pub fn enforce_cap(population: &mut Population, config: &XcsConfig, rng: &mut MinStdRand) -> usize {
    let mut evictions = 0;
    if delete_from_population(population, config, rng).is_some() {
        evictions += 1;
    }
    while population.numerosity() > config.max_population {
        if delete_from_population(population, config, rng).is_none() {
            break;
        }
        evictions += 1;
    }
    evictions
}
