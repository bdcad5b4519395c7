//! Genetic algorithm over the action set: trigger, roulette selection,
//! two-point crossover, mutation toward the current perception, and
//! insertion with merge or parental subsumption.

use tracing::{debug, trace};
use xcs_core::{Action, Classifier, Feature, MinStdRand, Symbol, XcsConfig};

use crate::deletion;
use crate::population::{ClassifierId, Population};

/// The step a GA cycle runs in
#[derive(Debug, Clone, Copy)]
pub struct Generation<'a> {
    pub time: u64,
    pub perception: &'a [Feature],
    pub actions: &'a [Action],
    pub subsumption: bool,
}

/// What one GA cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GaReport {
    /// Offspring stored, either as new classifiers or merged into identical ones
    pub inserted: u64,
    /// Offspring absorbed by a parent
    pub subsumed: u64,
    /// Turns with no valid parent pair
    pub skipped: u64,
    pub evictions: u64,
}

/// True when the numerosity-weighted mean timestamp of the set lags `time` by more than `theta_ga`
pub fn should_run(
    population: &Population,
    action_set: &[ClassifierId],
    time: u64,
    theta_ga: u64,
) -> bool {
    let (stamp_sum, numerosity) = action_set
        .iter()
        .filter_map(|&id| population.get(id))
        .fold((0.0, 0u64), |(stamps, n), cl| {
            (stamps + cl.timestamp as f64 * cl.numerosity as f64, n + cl.numerosity)
        });
    if numerosity == 0 {
        return false;
    }
    let mean_stamp = stamp_sum / numerosity as f64;
    time as f64 - mean_stamp > theta_ga as f64
}

/// Fitness-proportionate choice over the action set. `None` when empty or without fitness.
pub fn select_parent(
    population: &Population,
    action_set: &[ClassifierId],
    rng: &mut MinStdRand,
) -> Option<ClassifierId> {
    let candidates: Vec<(ClassifierId, f64)> = action_set
        .iter()
        .filter_map(|&id| population.get(id).map(|cl| (id, cl.fitness)))
        .collect();
    let fitness_sum: f64 = candidates.iter().map(|(_, f)| f).sum();
    if fitness_sum.is_nan() || fitness_sum <= 0.0 {
        return None;
    }

    let spin = rng.next_f64() * fitness_sum;
    let mut cumulative = 0.0;
    candidates
        .iter()
        .find(|(_, fitness)| {
            cumulative += fitness;
            cumulative > spin
        })
        .or_else(|| candidates.last())
        .map(|&(id, _)| id)
}

/// Swap the condition range `[from, to)` between two offspring
pub fn crossover(one: &mut Classifier, two: &mut Classifier, rng: &mut MinStdRand) {
    let len = one.condition.len().min(two.condition.len());
    let from = ((rng.next_f64() * (len + 1) as f64) as usize).min(len);
    let to = (from + (rng.next_f64() * (len - from + 1) as f64) as usize).min(len);
    for i in from..to {
        std::mem::swap(&mut one.condition[i], &mut two.condition[i]);
    }
}

/// Flip positions between wildcard and the perceived literal, and maybe reassign the action
pub fn mutate(
    classifier: &mut Classifier,
    perception: &[Feature],
    actions: &[Action],
    mutation_rate: f64,
    rng: &mut MinStdRand,
) {
    for (symbol, &value) in classifier.condition.iter_mut().zip(perception) {
        if rng.chance(mutation_rate) {
            *symbol = if symbol.is_wildcard() {
                Symbol::from_feature(value).unwrap_or(Symbol::Wildcard)
            } else {
                Symbol::Wildcard
            };
        }
    }
    if !actions.is_empty() && rng.chance(mutation_rate) {
        classifier.action = actions[rng.index(actions.len())];
    }
}

/// Run one GA cycle over the action set.
///
/// Every member of the set takes a turn: it is stamped with the current time,
/// two parents are drawn from the set, and their two offspring are inserted.
/// The population cap is enforced after each turn, and members evicted along
/// the way drop out of the set.
pub fn apply_ga(
    population: &mut Population,
    action_set: &mut Vec<ClassifierId>,
    step: &Generation<'_>,
    config: &XcsConfig,
    rng: &mut MinStdRand,
) -> GaReport {
    let mut report = GaReport::default();
    let members = action_set.clone();

    for id in members {
        let Some(member) = population.get_mut(id) else {
            continue;
        };
        member.timestamp = step.time;

        match (
            select_parent(population, action_set, rng),
            select_parent(population, action_set, rng),
        ) {
            (Some(pa), Some(ma)) => reproduce(population, pa, ma, step, config, rng, &mut report),
            _ => {
                trace!("No parent available for GA turn of {}", id);
                report.skipped += 1;
            }
        }

        report.evictions += deletion::enforce_cap(population, config, rng) as u64;
        action_set.retain(|&member| population.contains(member));
    }

    debug!(
        "GA at t={}: {} inserted, {} subsumed, {} skipped, {} evicted",
        step.time, report.inserted, report.subsumed, report.skipped, report.evictions
    );
    report
}

fn reproduce(
    population: &mut Population,
    pa: ClassifierId,
    ma: ClassifierId,
    step: &Generation<'_>,
    config: &XcsConfig,
    rng: &mut MinStdRand,
    report: &mut GaReport,
) {
    let (Some(father), Some(mother)) = (population.get(pa), population.get(ma)) else {
        return;
    };
    let mut jack = father.offspring(step.time);
    let mut jill = mother.offspring(step.time);

    if rng.chance(config.crossover_rate) {
        crossover(&mut jack, &mut jill, rng);
        let prediction = (father.prediction + mother.prediction) / 2.0;
        let error = (father.error + mother.error) / 2.0;
        let fitness = (father.fitness + mother.fitness) / 2.0;
        for child in [&mut jack, &mut jill] {
            child.prediction = prediction;
            child.error = error;
            child.fitness = fitness;
        }
    }

    if rng.chance(config.mutation_rate) {
        mutate(&mut jack, step.perception, step.actions, config.mutation_rate, rng);
    }
    if rng.chance(config.mutation_rate) {
        mutate(&mut jill, step.perception, step.actions, config.mutation_rate, rng);
    }

    for (child, parent) in [(jack, pa), (jill, ma)] {
        let absorbed = step.subsumption
            && population
                .get(parent)
                .is_some_and(|p| p.does_subsume(&child, config.theta_sub, config.error_threshold));
        if absorbed {
            if let Some(p) = population.get_mut(parent) {
                p.numerosity += 1;
            }
            report.subsumed += 1;
        } else {
            population.insert(child);
            report.inserted += 1;
        }
    }
}
