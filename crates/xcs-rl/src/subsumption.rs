//! Action-set subsumption

use tracing::debug;
use xcs_core::{MinStdRand, XcsConfig};

use crate::population::{ClassifierId, Population};

/// Pick the most general classifier in the set that is allowed to subsume.
///
/// Ties on generality are broken uniformly at random.
pub fn most_general_subsumer(
    population: &Population,
    action_set: &[ClassifierId],
    config: &XcsConfig,
    rng: &mut MinStdRand,
) -> Option<ClassifierId> {
    let mut best: Option<(ClassifierId, usize)> = None;
    let mut ties = 0;

    for &id in action_set {
        let Some(cl) = population.get(id) else {
            continue;
        };
        if !cl.could_subsume(config.theta_sub, config.error_threshold) {
            continue;
        }
        let generality = cl.generality();
        match best {
            Some((_, top)) if generality < top => {}
            Some((_, top)) if generality == top => {
                ties += 1;
                if rng.index(ties) == 0 {
                    best = Some((id, generality));
                }
            }
            _ => {
                best = Some((id, generality));
                ties = 1;
            }
        }
    }

    best.map(|(id, _)| id)
}

/// Fold every classifier the chosen subsumer strictly generalizes into it.
///
/// Absorbed classifiers leave both the action set and the population; their
/// numerosity moves to the subsumer. Returns the numerosity transferred.
pub fn action_set_subsumption(
    population: &mut Population,
    action_set: &mut Vec<ClassifierId>,
    config: &XcsConfig,
    rng: &mut MinStdRand,
) -> u64 {
    let Some(subsumer_id) = most_general_subsumer(population, action_set, config, rng) else {
        return 0;
    };
    let Some(subsumer) = population.get(subsumer_id).cloned() else {
        return 0;
    };

    let mut absorbed = 0;
    let mut survivors = Vec::with_capacity(action_set.len());
    for &id in action_set.iter() {
        let swallowed = id != subsumer_id
            && population
                .get(id)
                .is_some_and(|cl| cl.action == subsumer.action && subsumer.is_more_general(cl));
        if swallowed {
            if let Some(removed) = population.remove(id) {
                debug!(
                    "{} subsumed {} (numerosity {})",
                    subsumer.condition_string(),
                    removed.condition_string(),
                    removed.numerosity
                );
                absorbed += removed.numerosity;
            }
        } else {
            survivors.push(id);
        }
    }

    if let Some(cl) = population.get_mut(subsumer_id) {
        cl.numerosity += absorbed;
    }
    *action_set = survivors;
    absorbed
}
