//! XCS Core - Classifier rules, tunables, and shared functionality
//!
//! This crate provides the foundational types used by the XCS engine and
//! its drivers: the ternary classifier rule, the deterministic generator,
//! the configuration, and the one-line text record for a classifier.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod record;
pub mod rng;
pub mod types;

pub use classifier::Classifier;
pub use config::XcsConfig;
pub use error::{Result, XcsError};
pub use rng::MinStdRand;
pub use types::*;
