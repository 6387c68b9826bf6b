//! Numerical scanner: flags literals that reproduce empirical constants.
//!
//! Context-free by construction: a denylisted numeral is flagged wherever it
//! appears, erring toward over-detection.

use regex::Regex;
use sealgate_core::ContaminationLevel;
use sealgate_core::config::DetectorConfig;

use super::constants::{
    EMPIRICAL_CONSTANTS, EmpiricalConstant, FORBIDDEN_NUMERICS, relative_difference,
};
use crate::evidence::{ContaminationEvidence, EvidenceSource};

const CONFIRMED_CONFIDENCE: f64 = 0.95;
const LIKELY_CONFIDENCE: f64 = 0.7;

/// A signed numeric literal. Group 1 captures a leading `_` so subscripts
/// such as `codata_2018` or `theta_13` can be skipped. Group 2 captures a
/// leading run of dots so a preceding `.` or ellipsis cannot split the
/// literal that follows.
const LITERAL_PATTERN: &str =
    r"(?:(_)|(\.+))?([-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?)";

/// Literal-vs-reference matcher with two relative tolerances.
pub struct NumericalScanner {
    literal_re: Option<Regex>,
    confirmed_tolerance: f64,
    likely_tolerance: f64,
    exempt: Vec<f64>,
}

impl NumericalScanner {
    pub fn new(config: &DetectorConfig) -> Self {
        let literal_re = match Regex::new(LITERAL_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Failed to compile numeric literal pattern: {}", e);
                None
            }
        };
        Self {
            literal_re,
            confirmed_tolerance: config.confirmed_tolerance,
            likely_tolerance: config.likely_tolerance,
            exempt: config.exempt_numerics.clone(),
        }
    }

    /// Every finite numeric literal in `text`, in order of appearance.
    pub fn extract_literals(&self, text: &str) -> Vec<(String, f64)> {
        let Some(re) = &self.literal_re else {
            return Vec::new();
        };
        re.captures_iter(text)
            .filter_map(|caps| {
                if caps.get(1).is_some() {
                    return None;
                }
                let number = caps.get(3)?.as_str();
                // A single dot before a bare integer is a leading-dot literal (`.5`).
                let raw = match caps.get(2) {
                    Some(dots)
                        if dots.as_str() == "."
                            && !number.contains('.')
                            && !number.starts_with(['-', '+']) =>
                    {
                        format!(".{number}")
                    }
                    _ => number.to_string(),
                };
                let value: f64 = raw.parse().ok()?;
                value.is_finite().then_some((raw, value))
            })
            .collect()
    }

    pub fn is_exempt(&self, value: f64) -> bool {
        self.exempt.iter().any(|e| (e - value).abs() < f64::EPSILON)
    }

    pub fn scan(&self, text: &str, location: &str) -> Vec<ContaminationEvidence> {
        let mut evidence = Vec::new();

        for (raw, value) in self.extract_literals(text) {
            if self.is_exempt(value) {
                continue;
            }

            // Reference tables hold magnitudes; a sign never hides a match.
            let magnitude = value.abs();
            let mut confirmed = false;
            if let Some((constant, diff)) = closest(EMPIRICAL_CONSTANTS, magnitude) {
                let level = if diff < self.confirmed_tolerance {
                    Some((ContaminationLevel::Confirmed, CONFIRMED_CONFIDENCE))
                } else if diff < self.likely_tolerance {
                    Some((ContaminationLevel::Likely, LIKELY_CONFIDENCE))
                } else {
                    None
                };
                if let Some((level, confidence)) = level {
                    confirmed = level == ContaminationLevel::Confirmed;
                    evidence.push(
                        ContaminationEvidence::new(
                            EvidenceSource::Numerical,
                            level,
                            location,
                            format!(
                                "Literal {raw} matches empirical constant {} ({}) within relative difference {diff:.2e}",
                                constant.name, constant.value
                            ),
                            confidence,
                        )
                        .with_rule(format!("numerical.constant.{}", constant.name)),
                    );
                }
            }

            if confirmed {
                continue;
            }
            if let Some((constant, diff)) = closest(FORBIDDEN_NUMERICS, magnitude)
                && diff < self.confirmed_tolerance
            {
                evidence.push(
                    ContaminationEvidence::new(
                        EvidenceSource::Numerical,
                        ContaminationLevel::Confirmed,
                        location,
                        format!(
                            "Literal {raw} is the forbidden numeric {} ({})",
                            constant.name, constant.value
                        ),
                        CONFIRMED_CONFIDENCE,
                    )
                    .with_rule(format!("numerical.forbidden.{}", constant.name)),
                );
            }
        }

        evidence
    }
}

impl Default for NumericalScanner {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}

fn closest(table: &'static [EmpiricalConstant], value: f64) -> Option<(&'static EmpiricalConstant, f64)> {
    table
        .iter()
        .map(|c| (c, relative_difference(value, c.value)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
