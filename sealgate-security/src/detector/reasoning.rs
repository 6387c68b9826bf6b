//! Reasoning scanner: circular-logic phrasing in justifications.
//!
//! A hit here means the derivation process itself leaned on observation, so
//! every match is reported at `Confirmed`.

use regex::{Regex, RegexBuilder};
use sealgate_core::ContaminationLevel;

use crate::evidence::{ContaminationEvidence, EvidenceSource};

const REASONING_CONFIDENCE: f64 = 0.9;

struct ReasoningRule {
    name: &'static str,
    regex: Regex,
}

/// Detects justifications that argue from the answer back to the derivation.
pub struct ReasoningScanner {
    rules: Vec<ReasoningRule>,
}

impl ReasoningScanner {
    pub fn new() -> Self {
        let rules = REASONING_PATTERNS
            .iter()
            .filter_map(|&(name, pattern)| {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(regex) => Some(ReasoningRule { name, regex }),
                    Err(e) => {
                        tracing::warn!("Failed to compile reasoning pattern '{}': {}", name, e);
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Number of compiled rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn scan(&self, justification: &str, location: &str) -> Vec<ContaminationEvidence> {
        if justification.trim().is_empty() {
            return Vec::new();
        }

        self.rules
            .iter()
            .filter_map(|rule| {
                let m = rule.regex.find(justification)?;
                Some(
                    ContaminationEvidence::new(
                        EvidenceSource::Reasoning,
                        ContaminationLevel::Confirmed,
                        location,
                        format!("Circular reasoning: '{}'", m.as_str()),
                        REASONING_CONFIDENCE,
                    )
                    .with_rule(format!("reasoning.{}", rule.name)),
                )
            })
            .collect()
    }
}

impl Default for ReasoningScanner {
    fn default() -> Self {
        Self::new()
    }
}

const REASONING_PATTERNS: &[(&str, &str)] = &[
    (
        "argued_from_observation",
        r"\bbecause\s+(?:we|it\s+is|they\s+are)\s+observ",
    ),
    ("adjusted_to_match", r"\badjusted\s+to\s+match\b"),
    ("fine_tuned", r"\bfine[\s-]?tuned\s+to\s+reproduce\b"),
    (
        "chosen_to_agree",
        r"\bchosen\s+to\s+(?:agree|match|reproduce)\b",
    ),
    ("tuned_to_fit", r"\btuned\s+to\s+fit\b"),
    (
        "matches_data",
        r"\bso\s+that\s+it\s+matches\s+(?:the\s+)?(?:data|experiment|observation|measurement)s?\b",
    ),
    ("known_from_experiment", r"\bwe\s+know\s+from\s+experiment\b"),
    ("reverse_engineered", r"\breverse[\s-]engineered\s+from\b"),
    (
        "set_to_measured",
        r"\b(?:set|fixed)\s+(?:equal\s+)?to\s+the\s+(?:measured|observed|experimental)\s+value\b",
    ),
    (
        "in_order_to_match",
        r"\bin\s+order\s+to\s+(?:match|reproduce)\s+(?:the\s+)?(?:measured|observed|experimental)\b",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(ReasoningScanner::new().rule_count(), REASONING_PATTERNS.len());
    }

    #[test]
    fn test_circular_phrases_confirmed() {
        let scanner = ReasoningScanner::new();
        for text in [
            "We take this form because we observe three generations",
            "The exponent was adjusted to match the spectrum",
            "Coefficient fine-tuned to reproduce the Lamb shift",
            "This branch is chosen to agree with the sign of g-2",
            "It is set to the measured value at the Z pole",
        ] {
            let ev = scanner.scan(text, "node:x/justification");
            assert_eq!(ev.len(), 1, "expected one hit for {text:?}");
            assert_eq!(ev[0].level, ContaminationLevel::Confirmed);
            assert_eq!(ev[0].source, EvidenceSource::Reasoning);
        }
    }

    #[test]
    fn test_rule_name_reported() {
        let ev = ReasoningScanner::new().scan("Mass REVERSE-ENGINEERED FROM the pole", "loc");
        assert_eq!(ev[0].rule.as_deref(), Some("reasoning.reverse_engineered"));
    }

    #[test]
    fn test_clean_justification() {
        let scanner = ReasoningScanner::new();
        assert!(
            scanner
                .scan("Follows from the minimal polynomial of phi", "loc")
                .is_empty()
        );
        assert!(scanner.scan("", "loc").is_empty());
    }
}
