//! Prediction array and explore/exploit action selection

use serde::Serialize;
use tracing::trace;
use xcs_core::{Action, MinStdRand};

use crate::population::{ClassifierId, Population};

/// Draws allowed while looking for an action with a non-zero prediction
pub const EXPLORE_RETRIES: usize = 100;

/// How an action was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Explore,
    Exploit,
}

/// Fitness-weighted prediction per action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionArray {
    entries: Vec<PredictionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionEntry {
    pub action: Action,
    /// Sum of prediction * fitness, divided by `fitness_sum` once built
    pub value: f64,
    pub fitness_sum: f64,
}

impl PredictionArray {
    /// Build over the match set. One entry per action in `actions`, in that order.
    pub fn build(population: &Population, match_set: &[ClassifierId], actions: &[Action]) -> Self {
        let mut entries: Vec<PredictionEntry> = actions
            .iter()
            .map(|&action| PredictionEntry {
                action,
                value: 0.0,
                fitness_sum: 0.0,
            })
            .collect();

        for classifier in match_set.iter().filter_map(|&id| population.get(id)) {
            if let Some(entry) = entries.iter_mut().find(|e| e.action == classifier.action) {
                entry.value += classifier.prediction * classifier.fitness;
                entry.fitness_sum += classifier.fitness;
            }
        }

        for entry in &mut entries {
            if entry.fitness_sum != 0.0 {
                entry.value /= entry.fitness_sum;
            }
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[PredictionEntry] {
        &self.entries
    }

    /// Predicted payoff of an action, 0 when no classifier advocates it
    pub fn value(&self, action: Action) -> f64 {
        self.entries
            .iter()
            .find(|e| e.action == action)
            .map_or(0.0, |e| e.value)
    }

    /// Action with the strictly highest value; ties keep the earliest action
    pub fn best(&self) -> Option<Action> {
        let mut entries = self.entries.iter();
        let first = entries.next()?;
        let best = entries.fold(first, |best, e| if e.value > best.value { e } else { best });
        Some(best.action)
    }

    /// Uniform draw among actions with a non-zero value; after `EXPLORE_RETRIES` misses the last draw stands
    pub fn explore(&self, rng: &mut MinStdRand) -> Option<Action> {
        if self.entries.is_empty() {
            return None;
        }
        let mut choice = &self.entries[rng.index(self.entries.len())];
        let mut tries = 0;
        while choice.value == 0.0 && tries < EXPLORE_RETRIES {
            choice = &self.entries[rng.index(self.entries.len())];
            tries += 1;
        }
        Some(choice.action)
    }
}

/// Epsilon-greedy choice over the prediction array
pub fn select_action(
    array: &PredictionArray,
    epsilon: f64,
    rng: &mut MinStdRand,
) -> Option<(Action, SelectionMode)> {
    let (action, mode) = if rng.chance(epsilon) {
        (array.explore(rng)?, SelectionMode::Explore)
    } else {
        (array.best()?, SelectionMode::Exploit)
    };
    trace!("Selected action {} ({:?})", action, mode);
    Some((action, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcs_core::{Classifier, Symbol};

    fn rule(pattern: &str, action: Action, prediction: f64, fitness: f64) -> Classifier {
        let condition = pattern.chars().filter_map(Symbol::from_char).collect();
        let mut cl = Classifier::new(condition, action, 0);
        cl.prediction = prediction;
        cl.fitness = fitness;
        cl
    }

    fn array_of(rules: Vec<Classifier>, actions: &[Action]) -> PredictionArray {
        let mut population = Population::new();
        let ids: Vec<_> = rules.into_iter().map(|r| population.insert(r).id()).collect();
        PredictionArray::build(&population, &ids, actions)
    }

    #[test]
    fn test_fitness_weighted_average() {
        let array = array_of(
            vec![rule("0#", 1, 1000.0, 0.75), rule("#1", 1, 0.0, 0.25)],
            &[0, 1],
        );
        assert!((array.value(1) - 750.0).abs() < 1e-9);
        assert_eq!(array.value(0), 0.0);
        assert_eq!(array.entries()[0].fitness_sum, 0.0);
    }

    #[test]
    fn test_zero_fitness_leaves_zero_value() {
        let array = array_of(vec![rule("0#", 0, 500.0, 0.0)], &[0, 1]);
        assert_eq!(array.value(0), 0.0);
    }

    #[test]
    fn test_best_prefers_strictly_higher() {
        let array = array_of(
            vec![rule("00", 0, 200.0, 1.0), rule("01", 1, 200.0, 1.0)],
            &[0, 1],
        );
        assert_eq!(array.best(), Some(0));

        let array = array_of(
            vec![rule("00", 0, -1000.0, 1.0), rule("01", 1, -10.0, 1.0)],
            &[0, 1],
        );
        assert_eq!(array.best(), Some(1));
    }

    #[test]
    fn test_explore_avoids_zero_predictions() {
        let array = array_of(vec![rule("00", 2, 300.0, 1.0)], &[0, 1, 2, 3]);
        let mut rng = MinStdRand::new(9);
        for _ in 0..50 {
            assert_eq!(array.explore(&mut rng), Some(2));
        }
    }

    #[test]
    fn test_explore_terminates_when_all_zero() {
        let array = array_of(vec![], &[0, 1]);
        let mut rng = MinStdRand::new(9);
        let action = array.explore(&mut rng).unwrap();
        assert!(action == 0 || action == 1);
    }

    #[test]
    fn test_select_action_modes() {
        let array = array_of(
            vec![rule("00", 0, 10.0, 1.0), rule("00", 1, 900.0, 1.0)],
            &[0, 1],
        );
        let mut rng = MinStdRand::new(1);
        assert_eq!(
            select_action(&array, 0.0, &mut rng),
            Some((1, SelectionMode::Exploit))
        );
        let (_, mode) = select_action(&array, 1.0, &mut rng).unwrap();
        assert_eq!(mode, SelectionMode::Explore);
    }

    #[test]
    fn test_empty_action_space() {
        let array = array_of(vec![], &[]);
        let mut rng = MinStdRand::new(1);
        assert!(array.best().is_none());
        assert!(select_action(&array, 0.5, &mut rng).is_none());
    }
}
