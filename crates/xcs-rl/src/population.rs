//! Population store - owning arena of classifiers keyed by stable ids
//!
//! Match and action sets hold `ClassifierId`s, never references, so the
//! population may grow and shrink while those sets are alive. An id that has
//! been removed simply stops resolving.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use xcs_core::{Action, Classifier, Symbol};

/// Stable handle to a classifier in a `Population`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ClassifierId(u64);

impl std::fmt::Display for ClassifierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of inserting a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Stored as a new macro-classifier
    Added(ClassifierId),
    /// An identical rule existed; its numerosity absorbed the newcomer's
    Merged(ClassifierId),
}

impl Insertion {
    pub fn id(self) -> ClassifierId {
        match self {
            Insertion::Added(id) | Insertion::Merged(id) => id,
        }
    }
}

type RuleKey = (Vec<Symbol>, Action);

/// The set of classifiers. No two members share a (condition, action) pair.
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: BTreeMap<ClassifierId, Classifier>,
    rules: HashMap<RuleKey, ClassifierId>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, merging into an existing identical rule by numerosity
    pub fn insert(&mut self, classifier: Classifier) -> Insertion {
        let key = (classifier.condition.clone(), classifier.action);
        if let Some(&id) = self.rules.get(&key) {
            if let Some(existing) = self.members.get_mut(&id) {
                existing.numerosity += classifier.numerosity;
                return Insertion::Merged(id);
            }
        }

        let id = ClassifierId(self.next_id);
        self.next_id += 1;
        self.rules.insert(key, id);
        self.members.insert(id, classifier);
        Insertion::Added(id)
    }

    pub fn get(&self, id: ClassifierId) -> Option<&Classifier> {
        self.members.get(&id)
    }

    /// Mutable access for statistics updates. Callers must not rewrite the condition or action.
    pub fn get_mut(&mut self, id: ClassifierId) -> Option<&mut Classifier> {
        self.members.get_mut(&id)
    }

    pub fn contains(&self, id: ClassifierId) -> bool {
        self.members.contains_key(&id)
    }

    /// Remove a classifier outright
    pub fn remove(&mut self, id: ClassifierId) -> Option<Classifier> {
        let removed = self.members.remove(&id)?;
        self.rules.remove(&(removed.condition.clone(), removed.action));
        Some(removed)
    }

    /// Drop one micro-classifier. Returns the classifier if that removed it entirely.
    pub fn decrement(&mut self, id: ClassifierId) -> Option<Classifier> {
        let classifier = self.members.get_mut(&id)?;
        classifier.numerosity = classifier.numerosity.saturating_sub(1);
        if classifier.numerosity == 0 {
            self.remove(id)
        } else {
            None
        }
    }

    /// Find the id of the stored rule identical to `classifier`
    pub fn find(&self, classifier: &Classifier) -> Option<ClassifierId> {
        self.rules
            .get(&(classifier.condition.clone(), classifier.action))
            .copied()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ClassifierId, &Classifier)> {
        self.members.iter().map(|(&id, cl)| (id, cl))
    }

    /// Number of macro-classifiers
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Total number of micro-classifiers
    pub fn numerosity(&self) -> u64 {
        self.members.values().map(|cl| cl.numerosity).sum()
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.rules.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, action: Action) -> Classifier {
        let condition = pattern.chars().filter_map(Symbol::from_char).collect();
        Classifier::new(condition, action, 0)
    }

    #[test]
    fn test_insert_new_and_merge() {
        let mut population = Population::new();
        let first = population.insert(rule("0#", 1));
        assert!(matches!(first, Insertion::Added(_)));

        let second = population.insert(rule("0#", 1));
        assert_eq!(second, Insertion::Merged(first.id()));
        assert_eq!(population.len(), 1);
        assert_eq!(population.numerosity(), 2);

        let third = population.insert(rule("0#", 0));
        assert!(matches!(third, Insertion::Added(_)));
        assert_eq!(population.len(), 2);
    }

    #[test]
    fn test_merge_adds_full_numerosity() {
        let mut population = Population::new();
        population.insert(rule("11", 0));
        let mut heavy = rule("11", 0);
        heavy.numerosity = 4;
        population.insert(heavy);
        assert_eq!(population.numerosity(), 5);
    }

    #[test]
    fn test_decrement_removes_at_zero() {
        let mut population = Population::new();
        let id = population.insert(rule("1#", 1)).id();
        population.insert(rule("1#", 1));

        assert!(population.decrement(id).is_none());
        assert_eq!(population.get(id).map(|c| c.numerosity), Some(1));

        let removed = population.decrement(id);
        assert!(removed.is_some());
        assert!(!population.contains(id));
        assert!(population.is_empty());
        assert!(population.find(&rule("1#", 1)).is_none());
    }

    #[test]
    fn test_removed_rule_can_be_reinserted() {
        let mut population = Population::new();
        let id = population.insert(rule("01", 0)).id();
        population.remove(id);
        let again = population.insert(rule("01", 0));
        assert!(matches!(again, Insertion::Added(new_id) if new_id != id));
    }

    #[test]
    fn test_iteration_in_insertion_order() {
        let mut population = Population::new();
        population.insert(rule("00", 0));
        population.insert(rule("01", 0));
        population.insert(rule("10", 0));
        let order: Vec<String> = population.iter().map(|(_, c)| c.condition_string()).collect();
        assert_eq!(order, vec!["00", "01", "10"]);
    }

    #[test]
    fn test_clear() {
        let mut population = Population::new();
        population.insert(rule("00", 0));
        population.clear();
        assert!(population.is_empty());
        assert_eq!(population.numerosity(), 0);
        assert!(population.find(&rule("00", 0)).is_none());
    }
}
