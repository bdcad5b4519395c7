//! CLI command modules

pub mod config;
pub mod population;
pub mod run;
