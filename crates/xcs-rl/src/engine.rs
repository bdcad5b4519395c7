//! XCS session - drives the act/update cycle over one population

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, trace, warn};
use xcs_core::{
    validate_perception, Action, Classifier, Feature, MinStdRand, Perception, Result, Reward,
    XcsConfig, XcsError,
};

use crate::genetic::{self, Generation};
use crate::matching;
use crate::population::{ClassifierId, Population};
use crate::selection::{self, PredictionArray};
use crate::subsumption;
use crate::update;

/// Where the session stands in the act/update protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingReward,
}

/// One learning session: population, protocol state, counters, and generator
pub struct Xcs {
    config: XcsConfig,
    actions: Vec<Action>,
    theta_act: usize,
    population: Population,
    match_set: Vec<ClassifierId>,
    action_set: Vec<ClassifierId>,
    percept: Perception,
    perception_len: Option<usize>,
    proposed: Option<Action>,
    phase: Phase,
    time: u64,
    reinforced: u64,
    seed: u32,
    rng: MinStdRand,
    learning: bool,
    subsumption: bool,
}

impl Xcs {
    /// Create a session over `actions` with default tunables
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        Self::with_config(actions, XcsConfig::default())
    }

    /// Create a session over `actions`.
    ///
    /// Without a configured seed one is drawn from 1..=10000.
    pub fn with_config(actions: Vec<Action>, config: XcsConfig) -> Result<Self> {
        config.validate()?;
        if actions.is_empty() {
            return Err(XcsError::EmptyActionSpace);
        }
        for (i, action) in actions.iter().enumerate() {
            if actions[..i].contains(action) {
                return Err(XcsError::DuplicateAction(*action));
            }
        }

        let seed = config
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(1..=10_000));
        let theta_act = config.theta_act.unwrap_or(actions.len());

        info!(
            "Created XCS session with {} actions, N={}, seed={}",
            actions.len(),
            config.max_population,
            seed
        );

        Ok(Self {
            config,
            actions,
            theta_act,
            population: Population::new(),
            match_set: Vec::new(),
            action_set: Vec::new(),
            percept: Vec::new(),
            perception_len: None,
            proposed: None,
            phase: Phase::Idle,
            time: 0,
            reinforced: 0,
            seed,
            rng: MinStdRand::new(seed),
            learning: true,
            subsumption: true,
        })
    }

    /// Choose an action for `perception` and advance time.
    ///
    /// Builds the match set (covering while learning) and picks
    /// epsilon-greedily from the prediction array. A pending step that was
    /// never rewarded is dropped.
    pub fn act(&mut self, perception: &[Feature]) -> Result<Action> {
        validate_perception(perception)?;
        if let Some(expected) = self.perception_len {
            if perception.len() != expected {
                return Err(XcsError::PerceptionLength {
                    expected,
                    found: perception.len(),
                });
            }
        }

        if self.phase == Phase::AwaitingReward {
            warn!(
                "act at t={} without update, step forfeits its reward",
                self.time
            );
        }

        self.time += 1;
        self.perception_len = Some(perception.len());
        self.action_set.clear();

        let match_set = matching::generate_match_set(
            &mut self.population,
            perception,
            &self.actions,
            self.theta_act,
            self.learning,
            self.time,
            &self.config,
            &mut self.rng,
        )?;
        if match_set.covered > 0 {
            debug!(
                "Match set at t={} needed {} covering rules",
                self.time, match_set.covered
            );
        }

        let array = PredictionArray::build(&self.population, &match_set.ids, &self.actions);
        trace!("Prediction array at t={}: {:?}", self.time, array.entries());

        let (action, _mode) = selection::select_action(&array, self.config.epsilon, &mut self.rng)
            .ok_or(XcsError::EmptyActionSpace)?;

        self.match_set = match_set.ids;
        self.percept = perception.to_vec();
        self.proposed = Some(action);
        self.phase = Phase::AwaitingReward;
        Ok(action)
    }

    /// Reward the action returned by the last `act`.
    ///
    /// While learning this updates the action set, runs subsumption when
    /// enabled, and runs a GA cycle once the set is stale.
    pub fn update(&mut self, reward: Reward) -> Result<()> {
        let (Phase::AwaitingReward, Some(action)) = (self.phase, self.proposed) else {
            return Err(XcsError::OutOfPhase(
                "update called without a pending act".to_string(),
            ));
        };
        self.phase = Phase::Idle;
        self.proposed = None;

        if reward > 0.0 {
            self.reinforced += 1;
        }
        if !self.learning {
            return Ok(());
        }

        self.action_set = matching::build_action_set(&self.population, &self.match_set, action);
        update::update_prediction(
            &mut self.population,
            &self.action_set,
            reward,
            self.config.beta,
        );
        update::update_fitness(&mut self.population, &self.action_set, &self.config);

        if self.subsumption {
            subsumption::action_set_subsumption(
                &mut self.population,
                &mut self.action_set,
                &self.config,
                &mut self.rng,
            );
        }

        if genetic::should_run(
            &self.population,
            &self.action_set,
            self.time,
            self.config.theta_ga,
        ) {
            let step = Generation {
                time: self.time,
                perception: &self.percept,
                actions: &self.actions,
                subsumption: self.subsumption,
            };
            genetic::apply_ga(
                &mut self.population,
                &mut self.action_set,
                &step,
                &self.config,
                &mut self.rng,
            );
        }

        self.match_set.retain(|&id| self.population.contains(id));
        Ok(())
    }

    pub fn learning_on(&mut self) {
        self.learning = true;
        info!("Learning enabled");
    }

    pub fn learning_off(&mut self) {
        self.learning = false;
        info!("Learning disabled");
    }

    pub fn subsumption_on(&mut self) {
        self.subsumption = true;
        info!("Subsumption enabled");
    }

    pub fn subsumption_off(&mut self) {
        self.subsumption = false;
        info!("Subsumption disabled");
    }

    pub fn is_learning(&self) -> bool {
        self.learning
    }

    pub fn is_subsuming(&self) -> bool {
        self.subsumption
    }

    /// Number of macro-classifiers
    pub fn population_size(&self) -> usize {
        self.population.len()
    }

    /// Number of micro-classifiers
    pub fn numerosity(&self) -> u64 {
        self.population.numerosity()
    }

    /// Fraction of steps so far that received a positive reward
    pub fn internal_performance(&self) -> f64 {
        if self.time == 0 {
            0.0
        } else {
            self.reinforced as f64 / self.time as f64
        }
    }

    pub fn current_time(&self) -> u64 {
        self.time
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn config(&self) -> &XcsConfig {
        &self.config
    }

    /// Classifiers in insertion order
    pub fn classifiers(&self) -> impl Iterator<Item = &Classifier> {
        self.population.iter().map(|(_, cl)| cl)
    }

    /// Discard the population and any pending step. Counters are kept.
    pub fn clear(&mut self) {
        let dropped = self.population.len();
        self.population.clear();
        self.match_set.clear();
        self.action_set.clear();
        self.percept.clear();
        self.perception_len = None;
        self.proposed = None;
        self.phase = Phase::Idle;
        info!("Cleared population ({} classifiers)", dropped);
    }

    /// Add previously saved classifiers, merging identical rules.
    ///
    /// Nothing is inserted unless every classifier fits this session: one
    /// condition length throughout, a known action, finite non-negative
    /// statistics, and numerosity of at least 1.
    pub fn restore(&mut self, classifiers: Vec<Classifier>) -> Result<usize> {
        let mut length = self.perception_len;
        for cl in &classifiers {
            if let Some(expected) = length {
                if cl.condition.len() != expected {
                    return Err(XcsError::PerceptionLength {
                        expected,
                        found: cl.condition.len(),
                    });
                }
            }
            length = Some(cl.condition.len());
            if !self.actions.contains(&cl.action) {
                return Err(XcsError::UnknownAction(cl.action));
            }
            cl.validate()?;
        }

        let count = classifiers.len();
        for cl in classifiers {
            self.population.insert(cl);
        }
        self.perception_len = length;
        info!(
            "Restored {} classifiers ({} in population, numerosity {})",
            count,
            self.population.len(),
            self.population.numerosity()
        );
        Ok(count)
    }

    pub fn stats(&self) -> XcsStats {
        let numerosity = self.population.numerosity();
        let mean_error = if numerosity == 0 {
            0.0
        } else {
            self.classifiers()
                .map(|cl| cl.error * cl.numerosity as f64)
                .sum::<f64>()
                / numerosity as f64
        };

        XcsStats {
            time: self.time,
            reinforced: self.reinforced,
            internal_performance: self.internal_performance(),
            population_size: self.population.len(),
            numerosity,
            mean_error,
            seed: self.seed,
            learning: self.learning,
            subsumption: self.subsumption,
        }
    }
}

/// Session statistics
#[derive(Debug, Clone, Serialize)]
pub struct XcsStats {
    pub time: u64,
    pub reinforced: u64,
    pub internal_performance: f64,
    pub population_size: usize,
    pub numerosity: u64,
    /// Numerosity-weighted mean prediction error
    pub mean_error: f64,
    pub seed: u32,
    pub learning: bool,
    pub subsumption: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcs_core::Symbol;

    fn seeded() -> Xcs {
        Xcs::with_config(vec![0, 1], XcsConfig::default().with_seed(42)).unwrap()
    }

    fn rule(pattern: &str, action: Action, numerosity: u64) -> Classifier {
        let condition = pattern.chars().filter_map(Symbol::from_char).collect();
        let mut cl = Classifier::new(condition, action, 0);
        cl.numerosity = numerosity;
        cl
    }

    #[test]
    fn test_creation_rejects_bad_action_space() {
        assert_eq!(
            Xcs::new(vec![]).err(),
            Some(XcsError::EmptyActionSpace)
        );
        assert_eq!(
            Xcs::new(vec![0, 1, 0]).err(),
            Some(XcsError::DuplicateAction(0))
        );
    }

    #[test]
    fn test_creation_rejects_bad_config() {
        let mut config = XcsConfig::default();
        config.beta = 0.0;
        assert!(matches!(
            Xcs::with_config(vec![0, 1], config),
            Err(XcsError::Config(_))
        ));
    }

    #[test]
    fn test_random_seed_in_range() {
        let xcs = Xcs::new(vec![0, 1]).unwrap();
        assert!((1..=10_000).contains(&xcs.seed()));
    }

    #[test]
    fn test_fresh_session() {
        let xcs = seeded();
        assert_eq!(xcs.current_time(), 0);
        assert_eq!(xcs.population_size(), 0);
        assert_eq!(xcs.internal_performance(), 0.0);
        assert_eq!(xcs.phase(), Phase::Idle);
        assert!(xcs.is_learning());
        assert!(xcs.is_subsuming());
    }

    #[test]
    fn test_act_covers_every_action() {
        let mut xcs = seeded();
        let action = xcs.act(&[0, 1]).unwrap();
        assert!(action == 0 || action == 1);
        assert_eq!(xcs.current_time(), 1);
        assert_eq!(xcs.phase(), Phase::AwaitingReward);

        let advocated: Vec<Action> = xcs
            .classifiers()
            .filter(|cl| cl.matches(&[0, 1]))
            .map(|cl| cl.action)
            .collect();
        assert!(advocated.contains(&0));
        assert!(advocated.contains(&1));
        assert!(xcs.classifiers().all(|cl| cl.timestamp == 1));
    }

    #[test]
    fn test_update_without_act_is_out_of_phase() {
        let mut xcs = seeded();
        assert!(matches!(xcs.update(1000.0), Err(XcsError::OutOfPhase(_))));

        xcs.act(&[1, 1]).unwrap();
        xcs.update(1000.0).unwrap();
        assert!(matches!(xcs.update(1000.0), Err(XcsError::OutOfPhase(_))));
        assert_eq!(xcs.stats().reinforced, 1);
    }

    #[test]
    fn test_first_update_learns_reward() {
        let mut xcs = seeded();
        let action = xcs.act(&[0, 0]).unwrap();
        xcs.update(1000.0).unwrap();

        let rewarded: Vec<&Classifier> = xcs
            .classifiers()
            .filter(|cl| cl.action == action && cl.matches(&[0, 0]))
            .collect();
        assert!(!rewarded.is_empty());
        for cl in rewarded {
            assert_eq!(cl.experience, 1);
            assert!((cl.prediction - 1000.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unrewarded_step_is_forfeited() {
        let mut xcs = seeded();
        xcs.act(&[0, 1]).unwrap();
        xcs.act(&[1, 0]).unwrap();
        xcs.update(1000.0).unwrap();

        assert_eq!(xcs.current_time(), 2);
        assert_eq!(xcs.internal_performance(), 0.5);
        assert!(xcs.classifiers().all(|cl| cl.experience <= 1));
    }

    #[test]
    fn test_invalid_perception_does_not_advance_time() {
        let mut xcs = seeded();
        assert_eq!(
            xcs.act(&[0, 2]).err(),
            Some(XcsError::InvalidPerception {
                position: 1,
                value: 2
            })
        );
        assert_eq!(xcs.current_time(), 0);

        xcs.act(&[0, 1]).unwrap();
        xcs.update(0.0).unwrap();
        assert_eq!(
            xcs.act(&[0, 1, 1]).err(),
            Some(XcsError::PerceptionLength {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(xcs.current_time(), 1);
    }

    #[test]
    fn test_learning_off_freezes_population() {
        let mut config = XcsConfig::default().with_seed(5);
        config.epsilon = 0.0;
        let mut xcs = Xcs::with_config(vec![3, 7], config).unwrap();
        xcs.learning_off();

        assert_eq!(xcs.act(&[1, 0, 1]).unwrap(), 3);
        xcs.update(1000.0).unwrap();
        assert_eq!(xcs.population_size(), 0);
        assert_eq!(xcs.internal_performance(), 1.0);
    }

    #[test]
    fn test_exploit_uses_learned_predictions() {
        let mut config = XcsConfig::default().with_seed(9);
        config.epsilon = 0.0;
        let mut xcs = Xcs::with_config(vec![0, 1], config).unwrap();

        let mut good = rule("01", 1, 1);
        good.prediction = 900.0;
        let mut bad = rule("01", 0, 1);
        bad.prediction = -900.0;
        xcs.restore(vec![bad, good]).unwrap();

        assert_eq!(xcs.act(&[0, 1]).unwrap(), 1);
    }

    #[test]
    fn test_numerosity_stays_under_cap() {
        let config = XcsConfig::default().with_seed(17).with_max_population(20);
        let mut xcs = Xcs::with_config(vec![0, 1], config).unwrap();
        let inputs = [[0, 0], [0, 1], [1, 0], [1, 1]];
        for step in 0..400 {
            let perception = inputs[step % 4];
            let action = xcs.act(&perception).unwrap();
            let correct = Action::from(perception[0] ^ perception[1]);
            xcs.update(if action == correct { 1000.0 } else { -1000.0 })
                .unwrap();
            assert!(xcs.numerosity() <= 20);
        }
    }

    #[test]
    fn test_clear_keeps_counters() {
        let mut xcs = seeded();
        xcs.act(&[0, 1]).unwrap();
        xcs.update(1000.0).unwrap();
        xcs.clear();

        assert_eq!(xcs.population_size(), 0);
        assert_eq!(xcs.current_time(), 1);
        assert_eq!(xcs.internal_performance(), 1.0);
        // perception length is free again
        xcs.act(&[0, 1, 1, 0]).unwrap();
        assert_eq!(xcs.current_time(), 2);
    }

    #[test]
    fn test_restore_merges_and_fixes_length() {
        let mut xcs = seeded();
        let count = xcs
            .restore(vec![rule("0#", 1, 2), rule("1#", 0, 1), rule("0#", 1, 3)])
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(xcs.population_size(), 2);
        assert_eq!(xcs.numerosity(), 6);
        assert!(matches!(
            xcs.act(&[0, 0, 0]),
            Err(XcsError::PerceptionLength { .. })
        ));
    }

    #[test]
    fn test_restore_is_all_or_nothing() {
        let mut xcs = seeded();
        assert_eq!(
            xcs.restore(vec![rule("0#", 1, 1), rule("1#", 4, 1)]).err(),
            Some(XcsError::UnknownAction(4))
        );
        assert!(matches!(
            xcs.restore(vec![rule("0#", 1, 1), rule("1##", 0, 1)]),
            Err(XcsError::PerceptionLength { .. })
        ));
        assert!(matches!(
            xcs.restore(vec![rule("0#", 1, 0)]),
            Err(XcsError::Record(_))
        ));
        assert_eq!(xcs.population_size(), 0);
    }

    #[test]
    fn test_restore_rejects_corrupt_statistics() {
        let mut xcs = seeded();
        let mut negative_size = rule("11", 0, 1);
        negative_size.action_set_size = -1e12;
        let mut nan_fitness = rule("10", 1, 1);
        nan_fitness.fitness = f64::NAN;

        for bad in [negative_size, nan_fitness] {
            assert!(matches!(
                xcs.restore(vec![rule("0#", 1, 1), bad]),
                Err(XcsError::Record(_))
            ));
        }
        assert_eq!(xcs.population_size(), 0);
    }

    #[test]
    fn test_cap_holds_after_rejected_restore() {
        let config = XcsConfig::default().with_seed(5).with_max_population(20);
        let mut xcs = Xcs::with_config(vec![0, 1], config).unwrap();
        let mut corrupt = rule("11", 0, 1);
        corrupt.action_set_size = -1e12;
        assert!(xcs.restore(vec![corrupt]).is_err());

        let inputs = [[0, 0], [0, 1], [1, 0]];
        for step in 0..600 {
            let perception = inputs[step % 3];
            let action = xcs.act(&perception).unwrap();
            let correct = Action::from(perception[0] ^ perception[1]);
            xcs.update(if action == correct { 1000.0 } else { -1000.0 })
                .unwrap();
            assert!(xcs.numerosity() <= 20, "cap exceeded: {}", xcs.numerosity());
        }
    }

    #[test]
    fn test_stats_serialize() {
        let mut xcs = seeded();
        xcs.act(&[1, 1]).unwrap();
        xcs.update(-1000.0).unwrap();

        let stats = xcs.stats();
        assert_eq!(stats.time, 1);
        assert_eq!(stats.reinforced, 0);
        assert_eq!(stats.seed, 42);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["time"], 1);
        assert_eq!(json["population_size"], stats.population_size);
    }
}
