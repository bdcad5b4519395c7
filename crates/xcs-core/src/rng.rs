//! Minimal-standard (Park-Miller) linear congruential generator
//!
//! Every stochastic decision in the engine draws from one of these, so a
//! session is fully reproducible from its seed.

use serde::{Deserialize, Serialize};

/// Modulus 2^31 - 1
pub const MODULUS: i64 = 2_147_483_647;
/// Multiplier 7^5
pub const MULTIPLIER: i64 = 16_807;

const QUOTIENT: i64 = MODULUS / MULTIPLIER;
const REMAINDER: i64 = MODULUS % MULTIPLIER;

/// Lehmer generator producing doubles in (0, 1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinStdRand {
    state: i64,
}

impl MinStdRand {
    /// Create a generator. A seed congruent to 0 would lock the sequence at 0 and is replaced by 1.
    pub fn new(seed: u32) -> Self {
        let state = i64::from(seed) % MODULUS;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Current internal state
    pub fn state(&self) -> i64 {
        self.state
    }

    /// Advance and return the new integer state in `1..MODULUS`
    pub fn next_state(&mut self) -> i64 {
        // Schrage's decomposition keeps A * seed inside i64 without overflow on 32-bit style arithmetic
        let hi = self.state / QUOTIENT;
        let lo = self.state % QUOTIENT;
        let test = MULTIPLIER * lo - REMAINDER * hi;
        self.state = if test > 0 { test } else { test + MODULUS };
        self.state
    }

    /// Next double in (0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.next_state() as f64 / MODULUS as f64
    }

    /// Bernoulli draw with the given probability
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

impl Default for MinStdRand {
    fn default() -> Self {
        Self::new(1)
    }
}
