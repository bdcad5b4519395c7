//! Benchmark problems for driving an XCS session
//!
//! The engine never perceives or acts on its own; these environments play
//! the caller's role in tests, benchmarks, and the CLI.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use xcs_core::{Action, Feature, Perception, Result, Reward};

use crate::engine::{Xcs, XcsStats};

/// Payoff for a correct answer
pub const CORRECT_REWARD: Reward = 1000.0;

/// Trait for single-step problems
pub trait Environment {
    /// Problem name
    fn name(&self) -> &str;

    /// Actions the problem accepts
    fn actions(&self) -> Vec<Action>;

    /// Draw the next perception
    fn perceive(&mut self) -> Perception;

    /// Payoff for taking `action` on `perception`
    fn reward(&self, perception: &[Feature], action: Action) -> Reward;
}

/// Two-bit exclusive or. Wrong answers are punished.
pub struct Xor {
    rng: StdRng,
}

impl Xor {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn answer(perception: &[Feature]) -> Action {
        Action::from(perception.iter().fold(0, |acc, &bit| acc ^ bit))
    }
}

impl Environment for Xor {
    fn name(&self) -> &str {
        "xor"
    }

    fn actions(&self) -> Vec<Action> {
        vec![0, 1]
    }

    fn perceive(&mut self) -> Perception {
        vec![self.rng.gen_range(0..=1), self.rng.gen_range(0..=1)]
    }

    fn reward(&self, perception: &[Feature], action: Action) -> Reward {
        if action == Self::answer(perception) {
            CORRECT_REWARD
        } else {
            -CORRECT_REWARD
        }
    }
}

/// Boolean multiplexer: `address_bits` select one of `2^address_bits` data bits.
/// Correct answers pay, wrong ones pay nothing.
pub struct Multiplexer {
    address_bits: usize,
    rng: StdRng,
}

impl Multiplexer {
    pub fn new(address_bits: usize, seed: u64) -> Self {
        Self {
            address_bits,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Perception length `k + 2^k`
    pub fn perception_len(&self) -> usize {
        self.address_bits + (1 << self.address_bits)
    }

    pub fn answer(&self, perception: &[Feature]) -> Action {
        let address = perception[..self.address_bits]
            .iter()
            .fold(0usize, |acc, &bit| (acc << 1) | usize::from(bit == 1));
        Action::from(perception[self.address_bits + address])
    }
}

impl Environment for Multiplexer {
    fn name(&self) -> &str {
        "multiplexer"
    }

    fn actions(&self) -> Vec<Action> {
        vec![0, 1]
    }

    fn perceive(&mut self) -> Perception {
        (0..self.perception_len()).map(|_| self.rng.gen_range(0..=1)).collect()
    }

    fn reward(&self, perception: &[Feature], action: Action) -> Reward {
        if action == self.answer(perception) {
            CORRECT_REWARD
        } else {
            0.0
        }
    }
}

/// Run `steps` act/update cycles against an environment
pub fn train<E: Environment + ?Sized>(xcs: &mut Xcs, env: &mut E, steps: u64) -> Result<XcsStats> {
    for _ in 0..steps {
        let perception = env.perceive();
        let action = xcs.act(&perception)?;
        xcs.update(env.reward(&perception, action))?;
    }
    Ok(xcs.stats())
}
