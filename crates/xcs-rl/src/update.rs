//! Prediction, error, action-set size, and fitness updates over the action set

use tracing::trace;
use xcs_core::{Reward, XcsConfig};

use crate::population::{ClassifierId, Population};

/// Update prediction, error, and action-set size estimate of every action-set member.
///
/// Until a classifier has `1 / beta` updates the estimates are exact running
/// averages; after that they are moving averages with rate `beta`. The error
/// is measured against the freshly updated prediction.
pub fn update_prediction(
    population: &mut Population,
    action_set: &[ClassifierId],
    reward: Reward,
    beta: f64,
) {
    let set_numerosity: u64 = action_set
        .iter()
        .filter_map(|&id| population.get(id))
        .map(|cl| cl.numerosity)
        .sum();
    if set_numerosity == 0 {
        trace!("Empty action set, skipping prediction update");
        return;
    }
    let set_numerosity = set_numerosity as f64;

    for &id in action_set {
        let Some(cl) = population.get_mut(id) else {
            continue;
        };
        cl.experience += 1;
        let experience = cl.experience as f64;
        let rate = if experience < 1.0 / beta {
            1.0 / experience
        } else {
            beta
        };

        cl.prediction += rate * (reward - cl.prediction);
        cl.error += rate * ((reward - cl.prediction).abs() - cl.error);
        cl.action_set_size += rate * (set_numerosity - cl.action_set_size);
    }
}

/// Accuracy of a classifier: 1 below the error threshold, a power-law fall-off above it
pub fn accuracy(error: f64, config: &XcsConfig) -> f64 {
    if error < config.error_threshold {
        1.0
    } else {
        config.alpha * (error / config.error_threshold).powf(-config.nu)
    }
}

/// Move each member's fitness toward its share of the set's numerosity-weighted accuracy
pub fn update_fitness(population: &mut Population, action_set: &[ClassifierId], config: &XcsConfig) {
    let accuracies: Vec<(ClassifierId, f64)> = action_set
        .iter()
        .filter_map(|&id| population.get(id).map(|cl| (id, accuracy(cl.error, config))))
        .collect();

    let accuracy_sum: f64 = accuracies
        .iter()
        .filter_map(|&(id, kappa)| population.get(id).map(|cl| kappa * cl.numerosity as f64))
        .sum();
    if accuracy_sum <= 0.0 {
        trace!("Zero accuracy sum, skipping fitness update");
        return;
    }

    for (id, kappa) in accuracies {
        if let Some(cl) = population.get_mut(id) {
            let share = kappa * cl.numerosity as f64 / accuracy_sum;
            cl.fitness += config.beta * (share - cl.fitness);
        }
    }
}
