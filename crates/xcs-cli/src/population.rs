//! Population files: one classifier record per line

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use xcs_core::{record, Classifier};
use xcs_rl::Xcs;

/// Write every classifier of the session to `path`, returning the number written
pub fn save(path: &Path, xcs: &Xcs) -> Result<usize> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create population file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    let mut written = 0;
    for cl in xcs.classifiers() {
        writeln!(out, "{}", record::encode(cl))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written += 1;
    }
    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Saved {} classifiers to {}", written, path.display());
    Ok(written)
}

/// Read classifier records from `path`. Blank lines are skipped.
pub fn load(path: &Path) -> Result<Vec<Classifier>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read population file {}", path.display()))?;
    parse(&text).with_context(|| format!("Malformed population file {}", path.display()))
}

/// Decode population text, naming the first bad line
pub fn parse(text: &str) -> Result<Vec<Classifier>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| record::decode(line).with_context(|| format!("line {}", n + 1)))
        .collect()
}

/// Aggregate figures for `xcs population show`
#[derive(Debug, Clone, serde::Serialize)]
pub struct Summary {
    pub classifiers: usize,
    pub numerosity: u64,
    pub mean_error: f64,
    pub mean_fitness: f64,
    pub mean_generality: f64,
}

impl Summary {
    pub fn of(classifiers: &[Classifier]) -> Self {
        let numerosity: u64 = classifiers.iter().map(|cl| cl.numerosity).sum();
        let weighted = |value: fn(&Classifier) -> f64| {
            if numerosity == 0 {
                0.0
            } else {
                classifiers
                    .iter()
                    .map(|cl| value(cl) * cl.numerosity as f64)
                    .sum::<f64>()
                    / numerosity as f64
            }
        };

        Self {
            classifiers: classifiers.len(),
            numerosity,
            mean_error: weighted(|cl| cl.error),
            mean_fitness: if classifiers.is_empty() {
                0.0
            } else {
                classifiers.iter().map(|cl| cl.fitness).sum::<f64>() / classifiers.len() as f64
            },
            mean_generality: weighted(|cl| cl.generality() as f64),
        }
    }
}

/// Accurate classifiers ordered by generality then numerosity, most general first
pub fn most_general_accurate(
    classifiers: &[Classifier],
    error_threshold: f64,
    limit: usize,
) -> Vec<&Classifier> {
    let mut accurate: Vec<&Classifier> = classifiers
        .iter()
        .filter(|cl| cl.error < error_threshold)
        .collect();
    accurate.sort_by(|a, b| {
        b.generality()
            .cmp(&a.generality())
            .then(b.numerosity.cmp(&a.numerosity))
    });
    accurate.truncate(limit);
    accurate
}
