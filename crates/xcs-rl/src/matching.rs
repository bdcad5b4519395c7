//! Match-set construction with covering, and action-set construction

use tracing::debug;
use xcs_core::{Action, Classifier, Feature, MinStdRand, Result, XcsConfig};

use crate::deletion;
use crate::population::{ClassifierId, Population};

/// Classifiers matching the current perception
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    pub ids: Vec<ClassifierId>,
    /// Distinct actions advocated by the members, in order of first appearance
    pub actions: Vec<Action>,
    /// Covering classifiers created while building this set
    pub covered: usize,
}

/// Collect every classifier that matches `perception`
pub fn scan(population: &Population, perception: &[Feature]) -> MatchSet {
    let mut set = MatchSet::default();
    for (id, classifier) in population.iter() {
        if classifier.matches(perception) {
            set.ids.push(id);
            if !set.actions.contains(&classifier.action) {
                set.actions.push(classifier.action);
            }
        }
    }
    set
}

/// Build the match set, covering until at least `theta_act` distinct actions are present.
///
/// Covering only happens when `covering` is set. Each round adds a rule for an
/// action missing from the set, runs eviction, and rescans. The number of rounds is
/// bounded by the size of the action space.
#[allow(clippy::too_many_arguments)]
pub fn generate_match_set(
    population: &mut Population,
    perception: &[Feature],
    actions: &[Action],
    theta_act: usize,
    covering: bool,
    time: u64,
    config: &XcsConfig,
    rng: &mut MinStdRand,
) -> Result<MatchSet> {
    let required = theta_act.min(actions.len());
    let mut rounds = 0;

    loop {
        let mut set = scan(population, perception);
        set.covered = rounds;

        if !covering || set.actions.len() >= required {
            return Ok(set);
        }
        if rounds == actions.len() {
            debug!(
                "Covering gave up after {} rounds with {} of {} actions present",
                rounds,
                set.actions.len(),
                required
            );
            return Ok(set);
        }

        let missing: Vec<Action> = actions
            .iter()
            .copied()
            .filter(|a| !set.actions.contains(a))
            .collect();
        let action = missing[rng.index(missing.len())];

        let cover = Classifier::cover(perception, action, time, config.p_hash, rng)?;
        debug!(
            "Covering {} -> {} at t={}",
            cover.condition_string(),
            action,
            time
        );
        population.insert(cover);
        deletion::delete_from_population(population, config, rng);

        rounds += 1;
    }
}

/// Members of the match set advocating `action`
pub fn build_action_set(
    population: &Population,
    match_set: &[ClassifierId],
    action: Action,
) -> Vec<ClassifierId> {
    match_set
        .iter()
        .copied()
        .filter(|&id| population.get(id).is_some_and(|cl| cl.action == action))
        .collect()
}
