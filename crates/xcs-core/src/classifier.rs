//! The classifier rule and its matching, covering, and generality operations

use serde::{Deserialize, Serialize};

use crate::error::{Result, XcsError};
use crate::rng::MinStdRand;
use crate::types::{Action, Feature, Symbol};

/// Prediction, error, and fitness of a freshly covered classifier
pub const INITIAL_ESTIMATE: f64 = 0.01;

/// A condition -> action rule with its learned statistics.
///
/// One stored classifier is a macro-classifier standing for `numerosity`
/// identical micro-classifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    pub condition: Vec<Symbol>,
    pub action: Action,
    pub prediction: f64,
    pub error: f64,
    pub fitness: f64,
    pub experience: u64,
    /// Time step of the last GA this classifier took part in
    pub timestamp: u64,
    /// Moving average of the numerosity of action sets it belonged to
    pub action_set_size: f64,
    pub numerosity: u64,
}

impl Classifier {
    /// A rule with fresh statistics
    pub fn new(condition: Vec<Symbol>, action: Action, timestamp: u64) -> Self {
        Self {
            condition,
            action,
            prediction: INITIAL_ESTIMATE,
            error: INITIAL_ESTIMATE,
            fitness: INITIAL_ESTIMATE,
            experience: 0,
            timestamp,
            action_set_size: 1.0,
            numerosity: 1,
        }
    }

    /// Synthesize a rule that matches `perception` and advocates `action`.
    ///
    /// Each position becomes a wildcard with probability `p_hash`, otherwise the literal feature.
    pub fn cover(
        perception: &[Feature],
        action: Action,
        time: u64,
        p_hash: f64,
        rng: &mut MinStdRand,
    ) -> Result<Self> {
        let mut condition = Vec::with_capacity(perception.len());
        for (position, &value) in perception.iter().enumerate() {
            let literal = Symbol::from_feature(value)
                .ok_or(XcsError::InvalidPerception { position, value })?;
            condition.push(if rng.chance(p_hash) {
                Symbol::Wildcard
            } else {
                literal
            });
        }
        Ok(Self::new(condition, action, time))
    }

    /// True iff every non-wildcard position equals the feature at that position
    pub fn matches(&self, perception: &[Feature]) -> bool {
        self.condition.len() == perception.len()
            && self
                .condition
                .iter()
                .zip(perception)
                .all(|(symbol, &value)| symbol.accepts(value))
    }

    /// Number of wildcards in the condition
    pub fn generality(&self) -> usize {
        self.condition.iter().filter(|s| s.is_wildcard()).count()
    }

    /// Strictly more wildcards than `specific`, and every literal of `self` agrees with `specific`
    pub fn is_more_general(&self, specific: &Classifier) -> bool {
        if self.condition.len() != specific.condition.len()
            || self.generality() <= specific.generality()
        {
            return false;
        }
        self.condition
            .iter()
            .zip(&specific.condition)
            .all(|(general, other)| general.is_wildcard() || general == other)
    }

    /// Experienced and accurate enough to absorb other rules
    pub fn could_subsume(&self, theta_sub: u64, error_threshold: f64) -> bool {
        self.experience > theta_sub && self.error < error_threshold
    }

    pub fn does_subsume(&self, other: &Classifier, theta_sub: u64, error_threshold: f64) -> bool {
        self.action == other.action
            && self.could_subsume(theta_sub, error_threshold)
            && self.is_more_general(other)
    }

    /// Same condition and action
    pub fn same_rule(&self, other: &Classifier) -> bool {
        self.action == other.action && self.condition == other.condition
    }

    /// Check the statistics a loaded rule carries.
    ///
    /// All estimates must be finite. Error, fitness, and action-set size
    /// cannot be negative, and numerosity is at least 1.
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, value: f64| {
            Err(XcsError::Record(format!(
                "classifier {} has invalid {name} {value}",
                self.condition_string()
            )))
        };
        if !self.prediction.is_finite() {
            return invalid("prediction", self.prediction);
        }
        for (name, value) in [
            ("error", self.error),
            ("fitness", self.fitness),
            ("action set size", self.action_set_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(name, value);
            }
        }
        if self.numerosity == 0 {
            return Err(XcsError::Record(format!(
                "classifier {} has zero numerosity",
                self.condition_string()
            )));
        }
        Ok(())
    }

    /// Fitness per micro-classifier
    pub fn micro_fitness(&self) -> f64 {
        if self.numerosity == 0 {
            0.0
        } else {
            self.fitness / self.numerosity as f64
        }
    }

    /// Inexperienced single copy used as GA offspring
    pub fn offspring(&self, time: u64) -> Self {
        Self {
            numerosity: 1,
            experience: 0,
            timestamp: time,
            ..self.clone()
        }
    }

    /// Condition rendered as `0`, `1`, `#` characters
    pub fn condition_string(&self) -> String {
        self.condition.iter().map(|s| s.to_char()).collect()
    }
}
