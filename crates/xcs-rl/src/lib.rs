//! XCS RL - The accuracy-based classifier system learning engine
//!
//! This crate provides the population store, match/action set construction,
//! prediction and fitness updates, the genetic algorithm, eviction, and
//! subsumption, tied together by the [`Xcs`] session.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]

pub mod deletion;
pub mod engine;
pub mod environment;
pub mod genetic;
pub mod matching;
pub mod population;
pub mod selection;
pub mod subsumption;
pub mod update;

pub use engine::{Phase, Xcs, XcsStats};
pub use environment::{train, Environment, Multiplexer, Xor};
pub use population::{ClassifierId, Population};
pub use selection::{PredictionArray, SelectionMode};
