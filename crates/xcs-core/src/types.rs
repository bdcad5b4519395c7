//! Common types used throughout XCS

use serde::{Deserialize, Serialize};

use crate::error::{Result, XcsError};

/// A single perception feature. Only 0 and 1 are meaningful to a ternary condition.
pub type Feature = i32;

/// An ordered sequence of features observed by the caller
pub type Perception = Vec<Feature>;

/// A discrete action drawn from the action space fixed at construction
pub type Action = i64;

/// Reward value from environment
pub type Reward = f64;

/// Ternary condition symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    /// Matches a 0 feature
    Zero,
    /// Matches a 1 feature
    One,
    /// Matches anything
    Wildcard,
}

impl Symbol {
    /// Literal symbol for a perception feature
    pub fn from_feature(value: Feature) -> Option<Self> {
        match value {
            0 => Some(Symbol::Zero),
            1 => Some(Symbol::One),
            _ => None,
        }
    }

    /// Whether this symbol accepts the given feature
    #[inline]
    pub fn accepts(self, value: Feature) -> bool {
        match self {
            Symbol::Wildcard => true,
            Symbol::Zero => value == 0,
            Symbol::One => value == 1,
        }
    }

    pub fn is_wildcard(self) -> bool {
        self == Symbol::Wildcard
    }

    /// Character used in the text record
    pub fn to_char(self) -> char {
        match self {
            Symbol::Zero => '0',
            Symbol::One => '1',
            Symbol::Wildcard => '#',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Symbol::Zero),
            '1' => Some(Symbol::One),
            '#' => Some(Symbol::Wildcard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Check that every feature of a perception can be represented by a literal symbol.
pub fn validate_perception(perception: &[Feature]) -> Result<()> {
    match perception
        .iter()
        .enumerate()
        .find(|(_, &value)| Symbol::from_feature(value).is_none())
    {
        Some((position, &value)) => Err(XcsError::InvalidPerception { position, value }),
        None => Ok(()),
    }
}
