//! Single-line text record for one classifier.
//!
//! Fields are space separated, in order: condition (`0`, `1`, `#` per
//! position), action, prediction, error, fitness, experience, timestamp,
//! action-set size, numerosity. Reading and writing whole files is left to
//! the caller.

use std::fmt;
use std::str::FromStr;

use crate::classifier::Classifier;
use crate::error::{Result, XcsError};
use crate::types::Symbol;

/// Number of fields in a record
pub const FIELD_COUNT: usize = 9;

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} {}",
            self.condition_string(),
            self.action,
            self.prediction,
            self.error,
            self.fitness,
            self.experience,
            self.timestamp,
            self.action_set_size,
            self.numerosity
        )
    }
}

impl FromStr for Classifier {
    type Err = XcsError;

    fn from_str(line: &str) -> Result<Self> {
        decode(line)
    }
}

/// Encode one classifier as a record line (no trailing newline)
pub fn encode(classifier: &Classifier) -> String {
    classifier.to_string()
}

/// Decode one record line
pub fn decode(line: &str) -> Result<Classifier> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return Err(XcsError::Record(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }

    let condition = fields[0]
        .chars()
        .map(|c| {
            Symbol::from_char(c)
                .ok_or_else(|| XcsError::Record(format!("unknown condition symbol '{c}'")))
        })
        .collect::<Result<Vec<_>>>()?;

    let classifier = Classifier {
        condition,
        action: parse_field(fields[1], "action")?,
        prediction: parse_field(fields[2], "prediction")?,
        error: parse_field(fields[3], "error")?,
        fitness: parse_field(fields[4], "fitness")?,
        experience: parse_field(fields[5], "experience")?,
        timestamp: parse_field(fields[6], "timestamp")?,
        action_set_size: parse_field(fields[7], "action set size")?,
        numerosity: parse_field(fields[8], "numerosity")?,
    };

    classifier.validate()?;
    Ok(classifier)
}

fn parse_field<T: FromStr>(text: &str, name: &str) -> Result<T> {
    text.parse()
        .map_err(|_| XcsError::Record(format!("invalid {name} '{text}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_fresh_classifier() {
        let cl = Classifier::new(vec![Symbol::One, Symbol::Zero, Symbol::Wildcard], 1, 12);
        assert_eq!(encode(&cl), "10# 1 0.01 0.01 0.01 0 12 1 1");
    }

    #[test]
    fn test_decode_fields() {
        let cl = decode("#01 0 -512.5 3.25 0.75 44 310 6.5 3").unwrap();
        assert_eq!(cl.condition_string(), "#01");
        assert_eq!(cl.action, 0);
        assert_eq!(cl.prediction, -512.5);
        assert_eq!(cl.error, 3.25);
        assert_eq!(cl.fitness, 0.75);
        assert_eq!(cl.experience, 44);
        assert_eq!(cl.timestamp, 310);
        assert_eq!(cl.action_set_size, 6.5);
        assert_eq!(cl.numerosity, 3);
    }

    #[test]
    fn test_decode_accepts_integral_action_set_size() {
        let cl: Classifier = "11 1 1000 0 1 30 90 4 2".parse().unwrap();
        assert_eq!(cl.action_set_size, 4.0);
    }

    #[test]
    fn test_decode_rejects_wrong_field_count() {
        assert!(matches!(decode("01 1 0.5"), Err(XcsError::Record(_))));
        assert!(matches!(decode(""), Err(XcsError::Record(_))));
        assert!(decode("01 1 0 0 0 0 0 1 1 extra").is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_symbol() {
        let err = decode("0x1 1 0 0 0 0 0 1 1").unwrap_err();
        assert!(err.to_string().contains('x'));
    }

    #[test]
    fn test_decode_rejects_bad_numbers() {
        assert!(decode("01 one 0 0 0 0 0 1 1").is_err());
        assert!(decode("01 1 0 0 0 -3 0 1 1").is_err());
        assert!(decode("01 1 0 0 0 0 0 1 0").is_err());
    }

    #[test]
    fn test_decode_rejects_unusable_statistics() {
        for line in [
            "01 0 NaN 0 0.5 0 0 1 1",
            "01 0 inf 0 0.5 0 0 1 1",
            "01 0 0 NaN 0.5 0 0 1 1",
            "01 0 0 -5 0.5 0 0 1 1",
            "01 0 0 0 inf 0 0 1 1",
            "01 0 0 0 -0.5 0 0 1 1",
            "01 0 0 0 0.5 0 0 -1e12 1",
            "01 0 0 0 0.5 0 0 NaN 1",
        ] {
            assert!(
                matches!(decode(line), Err(XcsError::Record(_))),
                "accepted {line}"
            );
        }
        // Negative predictions are ordinary for penalising problems
        assert!(decode("01 0 -1000 0 0.5 0 0 1 1").is_ok());
    }
}
